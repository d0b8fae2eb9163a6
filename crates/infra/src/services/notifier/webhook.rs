use super::INotifier;
use crate::config::WebhookConfig;
use renewal_reminders_domain::ReminderMessage;
use reqwest::Client;

pub const WEBHOOK_KEY_HEADER: &str = "renewal-reminders-webhook-key";

/// Posts every reminder as json to a webhook that takes care of the actual
/// delivery to the customer
pub struct WebhookNotifier {
    client: Client,
    url: String,
    key: String,
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.url.clone(),
            key: config.key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl INotifier for WebhookNotifier {
    async fn send(&self, message: &ReminderMessage) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .header(WEBHOOK_KEY_HEADER, &self.key)
            .json(message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
