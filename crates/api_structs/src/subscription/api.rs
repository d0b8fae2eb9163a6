use crate::dtos::SubscriptionDTO;
use renewal_reminders_domain::{
    Category, Currency, Frequency, Reminder, Subscription, SubscriptionStatus, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionDTO,
}

impl SubscriptionResponse {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription: SubscriptionDTO::new(subscription),
        }
    }
}

pub mod create_subscription {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: ID,
        pub name: String,
        pub price: f64,
        pub currency: Option<Currency>,
        pub frequency: Frequency,
        pub category: Category,
        pub customer_email: String,
        pub start_date: i64,
        /// Derived from `start_date` and `frequency` when missing
        pub renewal_date: Option<i64>,
        pub reminder_offsets: Option<Vec<i64>>,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod get_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod get_user_subscriptions {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub subscriptions: Vec<SubscriptionDTO>,
    }

    impl APIResponse {
        pub fn new(subscriptions: Vec<Subscription>) -> Self {
            Self {
                subscriptions: subscriptions.into_iter().map(SubscriptionDTO::new).collect(),
            }
        }
    }
}

pub mod update_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    #[derive(Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: Option<String>,
        pub price: Option<f64>,
        pub customer_email: Option<String>,
        pub renewal_date: Option<i64>,
        pub reminder_offsets: Option<Vec<i64>>,
        pub status: Option<SubscriptionStatus>,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod delete_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod reschedule_subscription_reminders {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// False when the subscription is not active or its renewal date has
        /// already passed
        pub scheduled: bool,
        pub reminders: Vec<Reminder>,
    }

    impl APIResponse {
        pub fn new(reminders: Option<Vec<Reminder>>) -> Self {
            Self {
                scheduled: reminders.is_some(),
                reminders: reminders.unwrap_or_default(),
            }
        }
    }
}
