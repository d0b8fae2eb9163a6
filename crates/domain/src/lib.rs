mod job;
mod message;
mod reminder;
mod shared;
mod subscription;

pub use job::{
    Backoff, InvalidJobError, JobOptions, ReminderJob, REMINDER_DELIVERY_ATTEMPTS,
    REMINDER_DELIVERY_BACKOFF_MILLIS,
};
pub use message::ReminderMessage;
pub use reminder::{reminder_job_id, Reminder, ReminderStatus, DAY_MILLIS};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use subscription::{
    derive_renewal_date, is_expired, is_valid_reminder_offset, normalize_reminder_offsets,
    Category, Currency, Frequency, InvalidSubscriptionError, Subscription, SubscriptionStatus,
    DEFAULT_REMINDER_OFFSETS, FALLBACK_REMINDER_OFFSETS, MAX_REMINDER_OFFSET_DAYS,
};
