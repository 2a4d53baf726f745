mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, MailRelayConfig};
use kinfolk_domain::CalendarRegistry;
pub use repos::{
    IContactRepo, IDeliveryRecordRepo, IImportantDateRepo, INotificationChannelRepo,
    IReminderRepo, IScheduledInstanceRepo, IVaultMembershipRepo, Repos,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, StaticTimeSys};
use system::RealSys;

#[derive(Clone)]
pub struct KinfolkContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    /// Built once at startup and only read afterwards
    pub calendars: Arc<CalendarRegistry>,
    pub transports: Arc<TransportRegistry>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl KinfolkContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let transports = TransportRegistry::from_config(&config);
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            calendars: Arc::new(CalendarRegistry::default()),
            transports: Arc::new(transports),
        }
    }

    /// Context backed by inmemory repositories where every notification is only logged
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            calendars: Arc::new(CalendarRegistry::default()),
            transports: Arc::new(TransportRegistry::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> KinfolkContext {
    KinfolkContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
