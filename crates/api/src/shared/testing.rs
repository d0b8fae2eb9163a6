use renewal_reminders_domain::{
    Category, Currency, Frequency, Subscription, SubscriptionStatus, DAY_MILLIS, ID,
};
use renewal_reminders_infra::{InMemoryNotifier, MockSys, RenewalContext};
use std::sync::Arc;

// Mon Mar 01 2021 12:00:00 UTC
pub const NOW: i64 = 1614600000000;

pub struct TestContext {
    pub ctx: RenewalContext,
    pub sys: Arc<MockSys>,
    pub notifier: Arc<InMemoryNotifier>,
}

pub fn setup() -> TestContext {
    let mut ctx = RenewalContext::create_inmemory();
    let sys = Arc::new(MockSys::new(NOW));
    let notifier = Arc::new(InMemoryNotifier::new());
    ctx.sys = sys.clone();
    ctx.notifier = notifier.clone();
    TestContext { ctx, sys, notifier }
}

pub fn subscription_factory(renewal_in_days: i64, offsets: Vec<i64>) -> Subscription {
    Subscription {
        id: ID::new(),
        user_id: ID::new(),
        name: "Premium".into(),
        price: 9.99,
        currency: Currency::USD,
        frequency: Frequency::Monthly,
        category: Category::Technology,
        status: SubscriptionStatus::Active,
        customer_email: "customer@example.com".into(),
        start_date: NOW - DAY_MILLIS,
        renewal_date: NOW + renewal_in_days * DAY_MILLIS,
        reminder_offsets: offsets,
        reminders: Vec::new(),
        created: NOW,
        updated: NOW,
    }
}

pub async fn insert_subscription(ctx: &RenewalContext, subscription: &Subscription) {
    ctx.repos
        .subscriptions
        .insert(subscription)
        .await
        .expect("To insert subscription");
}

pub async fn find_subscription(ctx: &RenewalContext, subscription_id: &ID) -> Subscription {
    ctx.repos
        .subscriptions
        .find(subscription_id)
        .await
        .expect("To find subscription")
}
