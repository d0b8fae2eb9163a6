use crate::subscription::Subscription;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A message ready to be handed over to a notification channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ReminderMessage {
    pub fn renewal_reminder(
        subscription: &Subscription,
        offset_days: i64,
        manage_subscription_url: &str,
    ) -> Self {
        let renewal_date = format_renewal_date(subscription.renewal_date);
        let plan = if subscription.name.is_empty() {
            String::new()
        } else {
            format!(" ({})", subscription.name)
        };

        Self {
            to: subscription.customer_email.clone(),
            subject: format!("Reminder: subscription renews on {}", renewal_date),
            body: format!(
                "Hi,\nYour subscription{} will renew on {}.\n\n\
                 You can cancel or manage your subscription here:\n{}\n\n\
                 (You're receiving this {} day(s) before renewal.)\n",
                plan, renewal_date, manage_subscription_url, offset_days
            ),
        }
    }
}

// E.g. "Mon Mar 01 2021"
fn format_renewal_date(ts: i64) -> String {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.format("%a %b %d %Y").to_string())
        .unwrap_or_else(|| ts.to_string())
}
