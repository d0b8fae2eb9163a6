use renewal_reminders_domain::{
    Category, Currency, Frequency, Reminder, Subscription, SubscriptionStatus, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDTO {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub status: SubscriptionStatus,
    pub customer_email: String,
    pub start_date: i64,
    pub renewal_date: i64,
    pub reminder_offsets: Vec<i64>,
    pub reminders: Vec<Reminder>,
    pub created: i64,
    pub updated: i64,
}

impl SubscriptionDTO {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            user_id: subscription.user_id,
            name: subscription.name,
            price: subscription.price,
            currency: subscription.currency,
            frequency: subscription.frequency,
            category: subscription.category,
            status: subscription.status,
            customer_email: subscription.customer_email,
            start_date: subscription.start_date,
            renewal_date: subscription.renewal_date,
            reminder_offsets: subscription.reminder_offsets,
            reminders: subscription.reminders,
            created: subscription.created,
            updated: subscription.updated,
        }
    }
}
