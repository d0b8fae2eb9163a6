use super::ISubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use renewal_reminders_domain::{Reminder, Subscription, ID};

pub struct InMemorySubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        insert(subscription, &self.subscriptions)
    }

    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()> {
        save(subscription, &self.subscriptions)
    }

    async fn save_reminders(&self, subscription_id: &ID, reminders: &[Reminder]) -> anyhow::Result<()> {
        update(subscription_id, &self.subscriptions, |s| {
            s.reminders = reminders.to_vec()
        })
    }

    async fn find(&self, subscription_id: &ID) -> Option<Subscription> {
        find(subscription_id, &self.subscriptions)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Subscription> {
        find_by(&self.subscriptions, |s| s.user_id == *user_id)
    }

    async fn delete(&self, subscription_id: &ID) -> Option<Subscription> {
        delete(subscription_id, &self.subscriptions)
    }
}
