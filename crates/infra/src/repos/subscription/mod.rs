mod inmemory;
mod postgres;

pub use inmemory::InMemorySubscriptionRepo;
pub use postgres::PostgresSubscriptionRepo;
use renewal_reminders_domain::{Reminder, Subscription, ID};

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    /// Atomically replaces the whole stored `Subscription`, reminders included
    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()>;
    /// Atomically replaces only the reminder list, every other field keeps
    /// its stored value
    async fn save_reminders(&self, subscription_id: &ID, reminders: &[Reminder]) -> anyhow::Result<()>;
    async fn find(&self, subscription_id: &ID) -> Option<Subscription>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<Subscription>;
    async fn delete(&self, subscription_id: &ID) -> Option<Subscription>;
}
