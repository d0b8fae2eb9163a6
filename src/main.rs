mod telemetry;

use renewal_reminders_api::Application;
use renewal_reminders_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("renewal_reminders_server".into(), "info".into());
    init_subscriber(subscriber)?;

    run_migration().await?;
    let context = setup_context().await?;

    let app = Application::new(context).await?;
    app.start().await?;
    Ok(())
}
