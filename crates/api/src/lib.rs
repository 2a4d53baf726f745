mod channel;
mod error;
mod important_date;
mod job_schedulers;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::start_send_reminders_job;
use kinfolk_infra::KinfolkContext;
use std::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use channel::GetChannelDeliveriesUseCase;
pub use error::KinfolkError;
pub use important_date::{RemoveImportantDateReminderUseCase, SyncImportantDateReminderUseCase};
pub use job_schedulers::send_due_reminders;
pub use reminder::send_due_reminders::{SendDueRemindersUseCase, TickReport};
pub use reminder::{
    CreateReminderUseCase, DeleteReminderUseCase, GetReminderInstancesUseCase,
    UpdateReminderUseCase,
};
pub use shared::reminder_input::{InvalidReminderInput, ReminderInput};
pub use shared::usecase::{execute, UseCase};

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    channel::configure_routes(cfg);
    important_date::configure_routes(cfg);
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    shutdown: CancellationToken,
}

impl Application {
    pub async fn new(context: KinfolkContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        let shutdown = CancellationToken::new();
        Application::start_job_schedulers(context, shutdown.clone());

        Ok(Self {
            server,
            port,
            shutdown,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: KinfolkContext, shutdown: CancellationToken) {
        start_send_reminders_job(context, shutdown);
    }

    async fn configure_server(context: KinfolkContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves until the server is stopped, then stops the dispatcher
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        info!("Server stopped, stopping the reminder dispatcher");
        self.shutdown.cancel();
        res
    }
}
