use super::INotifier;
use renewal_reminders_domain::ReminderMessage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// Keeps every message in memory instead of delivering it.
/// Useful for tests and local development.
pub struct InMemoryNotifier {
    sent: Mutex<Vec<ReminderMessage>>,
    failures_left: AtomicUsize,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Makes the next `count` sends fail
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<ReminderMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    async fn send(&self, message: &ReminderMessage) -> anyhow::Result<()> {
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(anyhow::anyhow!("Simulated delivery failure to {}", message.to));
        }

        info!("Reminder to {}: {}", message.to, message.subject);
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("Inmemory notifier lock was poisoned"))?
            .push(message.clone());
        Ok(())
    }
}
