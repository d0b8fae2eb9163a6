use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REMINDER_DELIVERY_ATTEMPTS: i32 = 5;
pub const REMINDER_DELIVERY_BACKOFF_MILLIS: i64 = 2000;

/// Every kind of job that can be put on the reminder queue.
///
/// Payloads are validated against this set when they are dequeued so that a
/// worker never acts on something it does not understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReminderJob {
    #[serde(rename_all = "camelCase")]
    SendReminder {
        subscription_id: ID,
        offset_days: i64,
    },
}

#[derive(Error, Debug)]
pub enum InvalidJobError {
    #[error("Malformed job payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ReminderJob {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendReminder { .. } => "send-reminder",
        }
    }

    pub fn to_payload(&self) -> Result<serde_json::Value, InvalidJobError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, InvalidJobError> {
        Ok(Self::deserialize(payload)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Backoff {
    #[serde(rename_all = "camelCase")]
    Exponential { base_millis: i64 },
}

impl Backoff {
    /// Delay before the next attempt after `attempts_made` failed attempts
    pub fn delay_for_attempt(&self, attempts_made: i32) -> i64 {
        match self {
            Self::Exponential { base_millis } => {
                let exponent = std::cmp::max(attempts_made, 1) - 1;
                base_millis.saturating_mul(2_i64.saturating_pow(exponent as u32))
            }
        }
    }
}

/// How the queue should treat a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOptions {
    /// Jobs with the same id are deduplicated by the queue
    pub job_id: String,
    pub delay_millis: i64,
    pub max_attempts: i32,
    pub backoff: Backoff,
    pub remove_on_success: bool,
}

impl JobOptions {
    pub fn reminder_delivery(job_id: String, delay_millis: i64) -> Self {
        Self {
            job_id,
            delay_millis: std::cmp::max(0, delay_millis),
            max_attempts: REMINDER_DELIVERY_ATTEMPTS,
            backoff: Backoff::Exponential {
                base_millis: REMINDER_DELIVERY_BACKOFF_MILLIS,
            },
            remove_on_success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exponential_backoff_doubles() {
        let backoff = Backoff::Exponential { base_millis: 2000 };
        assert_eq!(backoff.delay_for_attempt(1), 2000);
        assert_eq!(backoff.delay_for_attempt(2), 4000);
        assert_eq!(backoff.delay_for_attempt(3), 8000);
        assert_eq!(backoff.delay_for_attempt(4), 16000);
        assert_eq!(backoff.delay_for_attempt(0), 2000);
    }

    #[test]
    fn payload_is_tagged_with_job_kind() {
        let subscription_id: ID = "a574624d-7c7f-456c-bbdd-670710302d45".parse().unwrap();
        let job = ReminderJob::SendReminder {
            subscription_id,
            offset_days: 7,
        };
        let payload = job.to_payload().unwrap();
        assert_eq!(
            payload,
            json!({
                "kind": "send-reminder",
                "subscriptionId": "a574624d-7c7f-456c-bbdd-670710302d45",
                "offsetDays": 7
            })
        );
        assert_eq!(ReminderJob::from_payload(&payload).unwrap(), job);
    }

    #[test]
    fn rejects_malformed_payloads() {
        let unknown_kind = json!({ "kind": "send-invoice", "offsetDays": 7 });
        assert!(ReminderJob::from_payload(&unknown_kind).is_err());

        let missing_offset = json!({
            "kind": "send-reminder",
            "subscriptionId": "a574624d-7c7f-456c-bbdd-670710302d45"
        });
        assert!(ReminderJob::from_payload(&missing_offset).is_err());

        let bad_id = json!({ "kind": "send-reminder", "subscriptionId": "1", "offsetDays": 7 });
        assert!(ReminderJob::from_payload(&bad_id).is_err());
    }

    #[test]
    fn reminder_delivery_options() {
        let opts = JobOptions::reminder_delivery("job".into(), -5);
        assert_eq!(opts.delay_millis, 0);
        assert_eq!(opts.max_attempts, 5);
        assert_eq!(opts.backoff, Backoff::Exponential { base_millis: 2000 });
        assert!(opts.remove_on_success);
    }
}
