use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Mailbox the reminders are sent from, e.g. `Billing <billing@example.com>`
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Sent in the `renewal-reminders-webhook-key` header so the receiver can
    /// verify where the request came from
    pub key: String,
}

/// Which channel reminders are delivered through
#[derive(Debug, Clone)]
pub enum NotifierConfig {
    Smtp(SmtpConfig),
    Webhook(WebhookConfig),
    /// Messages are only logged and kept in memory
    InMemory,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Whether this process runs the reminder worker next to the http server
    pub worker_enabled: bool,
    /// Maximum number of reminders delivered simultaneously
    pub worker_concurrency: usize,
    /// How often the worker looks for due reminder jobs
    pub poll_interval_millis: u64,
    /// A claimed job that has not completed or failed within this duration is
    /// considered abandoned (e.g. the process crashed) and is delivered again.
    pub job_lock_timeout_millis: i64,
    /// Link included in every reminder so the customer can cancel or manage
    /// their subscription
    pub manage_subscription_url: String,
    pub notifier: NotifierConfig,
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: parse_env("PORT", 5000),
            worker_enabled: parse_env("REMINDER_WORKER_ENABLED", true),
            worker_concurrency: std::cmp::max(1, parse_env("REMINDER_WORKER_CONCURRENCY", 5)),
            poll_interval_millis: parse_env("REMINDER_POLL_INTERVAL_MS", 1000),
            job_lock_timeout_millis: parse_env("REMINDER_JOB_LOCK_TIMEOUT_MS", 1000 * 60 * 5),
            manage_subscription_url: std::env::var("MANAGE_SUBSCRIPTION_URL")
                .unwrap_or_else(|_| "https://yourapp.com/billing".into()),
            notifier: notifier_from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn notifier_from_env() -> NotifierConfig {
    if let Ok(host) = std::env::var("SMTP_HOST") {
        let username = std::env::var("SMTP_USER").unwrap_or_default();
        return NotifierConfig::Smtp(SmtpConfig {
            host,
            port: parse_env("SMTP_PORT", 587),
            from: std::env::var("SMTP_FROM").unwrap_or_else(|_| username.clone()),
            username,
            password: std::env::var("SMTP_PASS").unwrap_or_default(),
        });
    }
    if let Ok(url) = std::env::var("REMINDER_WEBHOOK_URL") {
        return NotifierConfig::Webhook(WebhookConfig {
            url,
            key: std::env::var("REMINDER_WEBHOOK_KEY").unwrap_or_default(),
        });
    }
    info!("Neither SMTP_HOST nor REMINDER_WEBHOOK_URL is set. Reminders will only be logged.");
    NotifierConfig::InMemory
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 7] = [
        "PORT",
        "REMINDER_WORKER_ENABLED",
        "REMINDER_WORKER_CONCURRENCY",
        "REMINDER_POLL_INTERVAL_MS",
        "SMTP_HOST",
        "SMTP_USER",
        "REMINDER_WEBHOOK_URL",
    ];

    fn clear_env() {
        for key in KEYS.iter() {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn uses_defaults_without_env() {
        clear_env();
        let config = Config::new();
        assert_eq!(config.port, 5000);
        assert!(config.worker_enabled);
        assert_eq!(config.worker_concurrency, 5);
        assert_eq!(config.poll_interval_millis, 1000);
        assert!(matches!(config.notifier, NotifierConfig::InMemory));
    }

    #[test]
    #[serial]
    fn falls_back_on_invalid_values() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("REMINDER_WORKER_CONCURRENCY", "0");
        let config = Config::new();
        assert_eq!(config.port, 5000);
        assert_eq!(config.worker_concurrency, 1);
        clear_env();
    }

    #[test]
    #[serial]
    fn prefers_smtp_over_webhook() {
        clear_env();
        std::env::set_var("SMTP_HOST", "smtp.example.com");
        std::env::set_var("SMTP_USER", "billing@example.com");
        std::env::set_var("REMINDER_WEBHOOK_URL", "https://example.com/hook");
        match Config::new().notifier {
            NotifierConfig::Smtp(smtp) => {
                assert_eq!(smtp.host, "smtp.example.com");
                assert_eq!(smtp.port, 587);
                assert_eq!(smtp.from, "billing@example.com");
            }
            other => panic!("Expected smtp notifier, got: {:?}", other),
        }

        std::env::remove_var("SMTP_HOST");
        assert!(matches!(Config::new().notifier, NotifierConfig::Webhook(_)));
        clear_env();
    }
}
