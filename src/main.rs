mod telemetry;

use kinfolk_api::Application;
use kinfolk_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("kinfolk_server".into(), "info".into());
    init_subscriber(subscriber);

    run_migration().await.expect("Migrations to be applied");
    let context = setup_context().await;
    info!(
        "Starting server on port: {} with timezone: {}",
        context.config.port, context.config.timezone
    );

    let app = Application::new(context).await?;
    app.start().await
}
