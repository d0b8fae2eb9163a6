use crate::shared::entity::ID;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day. Offsets are whole days and dates are treated as
/// instants, so a day is always exactly this long.
pub const DAY_MILLIS: i64 = 1000 * 60 * 60 * 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderStatus {
    Scheduled,
    Sent,
    Cancelled,
}

/// A `Reminder` represents a notification the customer should receive
/// `offset_days` before the renewal of the `Subscription` it is embedded in.
///
/// `SENT` and `CANCELLED` are terminal. The only way to get rid of a
/// `Reminder` is to replace the whole reminder list of the `Subscription`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub offset_days: i64,
    /// The timestamp at which the customer should be notified
    pub scheduled_for: i64,
    /// Identifier of the delivery job in the queue, see `reminder_job_id`
    pub job_id: String,
    pub sent_at: Option<i64>,
    pub status: ReminderStatus,
}

impl Reminder {
    pub fn scheduled(subscription_id: &ID, renewal_date: i64, offset_days: i64) -> Self {
        Self {
            offset_days,
            scheduled_for: renewal_date.saturating_sub(offset_days.saturating_mul(DAY_MILLIS)),
            job_id: reminder_job_id(subscription_id, offset_days, renewal_date),
            sent_at: None,
            status: ReminderStatus::Scheduled,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == ReminderStatus::Scheduled
    }

    /// Milliseconds from `now` until this reminder is due, never negative.
    /// Reminders that should already have been sent are due immediately.
    pub fn delay_millis(&self, now: i64) -> i64 {
        std::cmp::max(0, self.scheduled_for.saturating_sub(now))
    }

    /// Returns false if the reminder was not `SCHEDULED`
    pub fn mark_sent(&mut self, now: i64) -> bool {
        if !self.is_scheduled() {
            return false;
        }
        self.status = ReminderStatus::Sent;
        self.sent_at = Some(now);
        true
    }

    /// Returns false if the reminder was not `SCHEDULED`
    pub fn cancel(&mut self) -> bool {
        if !self.is_scheduled() {
            return false;
        }
        self.status = ReminderStatus::Cancelled;
        true
    }
}

/// Deterministic job identifier for one offset of one renewal cycle.
///
/// Only the date part of the renewal date takes part, so repeated scheduling
/// of the same cycle always collapses into the same queue entry.
pub fn reminder_job_id(subscription_id: &ID, offset_days: i64, renewal_date: i64) -> String {
    format!(
        "reminder:{}:{}:{}",
        subscription_id,
        offset_days,
        format_date_only(renewal_date)
    )
}

fn format_date_only(ts: i64) -> String {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.format("%F").to_string())
        .unwrap_or_else(|| ts.to_string())
}
