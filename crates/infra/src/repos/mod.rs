mod shared;
mod subscription;

use sqlx::PgPool;
use std::sync::Arc;
pub use subscription::{ISubscriptionRepo, InMemorySubscriptionRepo, PostgresSubscriptionRepo};

#[derive(Clone)]
pub struct Repos {
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
}

impl Repos {
    pub fn create_postgres(pool: PgPool) -> Self {
        Self {
            subscriptions: Arc::new(PostgresSubscriptionRepo::new(pool)),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
        }
    }
}
