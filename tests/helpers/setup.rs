use renewal_reminders_api::Application;
use renewal_reminders_infra::{Config, RenewalContext};

pub struct TestApp {
    pub config: Config,
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    spawn_app_with_context(RenewalContext::create_inmemory()).await
}

pub async fn spawn_app_with_context(mut ctx: RenewalContext) -> TestApp {
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        config,
        address,
        client: reqwest::Client::new(),
    }
}
