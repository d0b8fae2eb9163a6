use crate::{
    reminder::{Reminder, DAY_MILLIS},
    shared::entity::{Entity, ID},
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

pub const DEFAULT_REMINDER_OFFSETS: [i64; 3] = [30, 7, 1];
/// Used for scheduling when a subscription has no reminder offsets
pub const FALLBACK_REMINDER_OFFSETS: [i64; 1] = [7];
pub const MAX_REMINDER_OFFSET_DAYS: i64 = 36500;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidSubscriptionError {
    #[error("Reminder offsets must be positive number of days, got: {0}")]
    NonPositiveOffset(i64),
    #[error("Reminder offsets can be at most {} days, got: {0}", MAX_REMINDER_OFFSET_DAYS)]
    OffsetTooLarge(i64),
    #[error("The renewal date derived from start date: {0} is out of range")]
    RenewalDateOutOfRange(i64),
    #[error("Unknown {0}: `{1}`")]
    UnknownVariant(&'static str, String),
}

/// Generates `as_str` plus `Display` / `FromStr` for the string backed
/// enums of a `Subscription`, matching their serde representation.
macro_rules! string_enum {
    ($name:ident, $label:expr, { $($variant:ident => $value:expr),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidSubscriptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(InvalidSubscriptionError::UnknownVariant($label, s.to_string())),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

string_enum!(SubscriptionStatus, "status", {
    Active => "active",
    Cancelled => "cancelled",
    Expired => "expired",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

string_enum!(Frequency, "frequency", {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

impl Frequency {
    /// Length of one billing period
    pub fn period_days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
}

string_enum!(Currency, "currency", {
    USD => "USD",
    EUR => "EUR",
    GBP => "GBP",
});

impl Default for Currency {
    fn default() -> Self {
        Self::USD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    News,
    Entertainment,
    Lifestyle,
    Technology,
    Finance,
    Politics,
    Other,
}

string_enum!(Category, "category", {
    Sports => "sports",
    News => "news",
    Entertainment => "entertainment",
    Lifestyle => "lifestyle",
    Technology => "technology",
    Finance => "finance",
    Politics => "politics",
    Other => "other",
});

/// A recurring paid `Subscription` owned by a user.
///
/// The customer should be notified `reminder_offsets` days before every
/// `renewal_date`. The `reminders` always belong to the current renewal cycle.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub status: SubscriptionStatus,
    /// Where the reminders are delivered
    pub customer_email: String,
    pub start_date: i64,
    pub renewal_date: i64,
    pub reminder_offsets: Vec<i64>,
    pub reminders: Vec<Reminder>,
    pub created: i64,
    pub updated: i64,
}

impl Entity for Subscription {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Whether reminders can still be scheduled or delivered for the
    /// current renewal cycle
    pub fn accepts_reminders(&self, now: i64) -> bool {
        self.is_active() && self.renewal_date > now
    }

    /// The `SCHEDULED` reminder delivered by the given job, if any. Jobs of
    /// a previous renewal cycle never match since the cycle is part of the job id.
    pub fn scheduled_reminder_mut(&mut self, job_id: &str) -> Option<&mut Reminder> {
        self.reminders
            .iter_mut()
            .find(|r| r.job_id == job_id && r.is_scheduled())
    }

    /// Offsets the reminders of the current cycle are built from
    pub fn effective_reminder_offsets(&self) -> &[i64] {
        if self.reminder_offsets.is_empty() {
            &FALLBACK_REMINDER_OFFSETS
        } else {
            &self.reminder_offsets
        }
    }

    /// Replaces the reminder list wholesale, reminders are never patched
    /// from the outside
    pub fn replace_reminders(&mut self, reminders: Vec<Reminder>) {
        self.reminders = reminders;
    }

    pub fn set_reminder_offsets(
        &mut self,
        offsets: Vec<i64>,
    ) -> Result<(), InvalidSubscriptionError> {
        self.reminder_offsets = normalize_reminder_offsets(offsets)?;
        Ok(())
    }
}

/// Renewal date of a subscription started at `start_date`, used when the
/// client did not provide one
pub fn derive_renewal_date(
    start_date: i64,
    frequency: Frequency,
) -> Result<i64, InvalidSubscriptionError> {
    frequency
        .period_days()
        .checked_mul(DAY_MILLIS)
        .and_then(|period| start_date.checked_add(period))
        .ok_or(InvalidSubscriptionError::RenewalDateOutOfRange(start_date))
}

pub fn is_expired(renewal_date: i64, now: i64) -> bool {
    renewal_date < now
}

pub fn is_valid_reminder_offset(offset_days: i64) -> bool {
    (1..=MAX_REMINDER_OFFSET_DAYS).contains(&offset_days)
}

/// Validates the offsets and removes duplicates while keeping the given order,
/// so that there is never more than one reminder per offset.
pub fn normalize_reminder_offsets(offsets: Vec<i64>) -> Result<Vec<i64>, InvalidSubscriptionError> {
    let mut normalized = Vec::with_capacity(offsets.len());
    for offset in offsets {
        if offset <= 0 {
            return Err(InvalidSubscriptionError::NonPositiveOffset(offset));
        }
        if offset > MAX_REMINDER_OFFSET_DAYS {
            return Err(InvalidSubscriptionError::OffsetTooLarge(offset));
        }
        if !normalized.contains(&offset) {
            normalized.push(offset);
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_renewal_date_from_frequency() {
        let start = 1_000;
        assert_eq!(derive_renewal_date(start, Frequency::Daily), Ok(start + DAY_MILLIS));
        assert_eq!(
            derive_renewal_date(start, Frequency::Weekly),
            Ok(start + 7 * DAY_MILLIS)
        );
        assert_eq!(
            derive_renewal_date(start, Frequency::Monthly),
            Ok(start + 30 * DAY_MILLIS)
        );
        assert_eq!(
            derive_renewal_date(start, Frequency::Yearly),
            Ok(start + 365 * DAY_MILLIS)
        );
    }

    #[test]
    fn rejects_renewal_dates_out_of_range() {
        let start = i64::MAX - DAY_MILLIS;
        assert_eq!(
            derive_renewal_date(start, Frequency::Yearly),
            Err(InvalidSubscriptionError::RenewalDateOutOfRange(start))
        );
        assert!(derive_renewal_date(start - DAY_MILLIS, Frequency::Daily).is_ok());
    }

    #[test]
    fn expiry_is_strict() {
        assert!(is_expired(10, 11));
        assert!(!is_expired(10, 10));
        assert!(!is_expired(10, 9));
    }

    #[test]
    fn normalizes_offsets() {
        assert_eq!(
            normalize_reminder_offsets(vec![30, 7, 30, 1, 7]).unwrap(),
            vec![30, 7, 1]
        );
        assert_eq!(normalize_reminder_offsets(vec![]).unwrap(), Vec::<i64>::new());
        assert_eq!(
            normalize_reminder_offsets(vec![7, 0]),
            Err(InvalidSubscriptionError::NonPositiveOffset(0))
        );
        assert!(normalize_reminder_offsets(vec![-1]).is_err());
        assert_eq!(
            normalize_reminder_offsets(vec![7, 200_000_000_000]),
            Err(InvalidSubscriptionError::OffsetTooLarge(200_000_000_000))
        );
        assert_eq!(
            normalize_reminder_offsets(vec![MAX_REMINDER_OFFSET_DAYS]).unwrap(),
            vec![MAX_REMINDER_OFFSET_DAYS]
        );
    }

    #[test]
    fn empty_offsets_fall_back_to_a_week() {
        let mut subscription = Subscription {
            id: ID::new(),
            user_id: ID::new(),
            name: "Netflix".into(),
            price: 15.49,
            currency: Currency::USD,
            frequency: Frequency::Monthly,
            category: Category::Entertainment,
            status: SubscriptionStatus::Active,
            customer_email: "customer@example.com".into(),
            start_date: 0,
            renewal_date: 30 * DAY_MILLIS,
            reminder_offsets: Vec::new(),
            reminders: Vec::new(),
            created: 0,
            updated: 0,
        };
        assert_eq!(subscription.effective_reminder_offsets(), &[7]);

        subscription.reminder_offsets = vec![3, 1];
        assert_eq!(subscription.effective_reminder_offsets(), &[3, 1]);
    }

    #[test]
    fn string_enums_roundtrip_through_their_names() {
        assert_eq!("cancelled".parse::<SubscriptionStatus>(), Ok(SubscriptionStatus::Cancelled));
        assert_eq!("yearly".parse::<Frequency>(), Ok(Frequency::Yearly));
        assert_eq!("GBP".parse::<Currency>(), Ok(Currency::GBP));
        assert_eq!(Category::Technology.to_string(), "technology");
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }
}
