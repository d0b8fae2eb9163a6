mod inmemory;
mod smtp;
mod webhook;

use crate::config::NotifierConfig;
pub use inmemory::InMemoryNotifier;
use renewal_reminders_domain::ReminderMessage;
pub use smtp::SmtpNotifier;
use std::sync::Arc;
pub use webhook::WebhookNotifier;

/// Outbound channel for reminder messages
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn send(&self, message: &ReminderMessage) -> anyhow::Result<()>;
}

pub fn create_notifier(config: &NotifierConfig) -> anyhow::Result<Arc<dyn INotifier>> {
    let notifier: Arc<dyn INotifier> = match config {
        NotifierConfig::Smtp(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        NotifierConfig::Webhook(webhook) => Arc::new(WebhookNotifier::new(webhook)),
        NotifierConfig::InMemory => Arc::new(InMemoryNotifier::new()),
    };
    Ok(notifier)
}
