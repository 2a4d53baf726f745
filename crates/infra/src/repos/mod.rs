mod channel;
mod contact;
mod delivery_record;
mod important_date;
mod reminder;
mod scheduled_instance;
mod shared;
mod vault_membership;

pub use channel::INotificationChannelRepo;
use channel::{InMemoryNotificationChannelRepo, PostgresNotificationChannelRepo};
pub use contact::IContactRepo;
use contact::{InMemoryContactRepo, PostgresContactRepo};
pub use delivery_record::IDeliveryRecordRepo;
use delivery_record::{InMemoryDeliveryRecordRepo, PostgresDeliveryRecordRepo};
pub use important_date::IImportantDateRepo;
use important_date::{InMemoryImportantDateRepo, PostgresImportantDateRepo};
pub use reminder::IReminderRepo;
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
pub use scheduled_instance::IScheduledInstanceRepo;
use scheduled_instance::{InMemoryScheduledInstanceRepo, PostgresScheduledInstanceRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Mutex};
use tracing::info;
pub use vault_membership::IVaultMembershipRepo;
use vault_membership::{InMemoryVaultMembershipRepo, PostgresVaultMembershipRepo};

#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub scheduled_instances: Arc<dyn IScheduledInstanceRepo>,
    pub delivery_records: Arc<dyn IDeliveryRecordRepo>,
    pub channels: Arc<dyn INotificationChannelRepo>,
    pub contacts: Arc<dyn IContactRepo>,
    pub important_dates: Arc<dyn IImportantDateRepo>,
    pub vault_memberships: Arc<dyn IVaultMembershipRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            scheduled_instances: Arc::new(PostgresScheduledInstanceRepo::new(pool.clone())),
            delivery_records: Arc::new(PostgresDeliveryRecordRepo::new(pool.clone())),
            channels: Arc::new(PostgresNotificationChannelRepo::new(pool.clone())),
            contacts: Arc::new(PostgresContactRepo::new(pool.clone())),
            important_dates: Arc::new(PostgresImportantDateRepo::new(pool.clone())),
            vault_memberships: Arc::new(PostgresVaultMembershipRepo::new(pool)),
        })
    }

    /// Repositories over shared inmemory collections so that cascades and the
    /// delivery bundle behave like the postgres transactions
    pub fn create_inmemory() -> Self {
        let reminders = Arc::new(Mutex::new(Vec::new()));
        let instances = Arc::new(Mutex::new(Vec::new()));
        let records = Arc::new(Mutex::new(Vec::new()));
        let channels = Arc::new(Mutex::new(Vec::new()));
        let contacts = Arc::new(Mutex::new(Vec::new()));
        let important_dates = Arc::new(Mutex::new(Vec::new()));
        let memberships = Arc::new(Mutex::new(Vec::new()));

        Self {
            reminders: Arc::new(InMemoryReminderRepo::new(
                reminders.clone(),
                instances.clone(),
            )),
            scheduled_instances: Arc::new(InMemoryScheduledInstanceRepo::new(instances.clone())),
            delivery_records: Arc::new(InMemoryDeliveryRecordRepo::new(
                records,
                instances.clone(),
                channels.clone(),
                reminders.clone(),
            )),
            channels: Arc::new(InMemoryNotificationChannelRepo::new(
                channels,
                memberships.clone(),
                instances.clone(),
            )),
            contacts: Arc::new(InMemoryContactRepo::new(
                contacts,
                reminders.clone(),
                instances.clone(),
            )),
            important_dates: Arc::new(InMemoryImportantDateRepo::new(
                important_dates,
                reminders,
                instances,
            )),
            vault_memberships: Arc::new(InMemoryVaultMembershipRepo::new(memberships)),
        }
    }
}
