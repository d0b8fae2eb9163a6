use super::ISubscriptionRepo;
use renewal_reminders_domain::{Reminder, Subscription, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use std::convert::{TryFrom, TryInto};
use tracing::error;

pub struct PostgresSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRaw {
    subscription_uid: Uuid,
    user_uid: Uuid,
    name: String,
    price: f64,
    currency: String,
    frequency: String,
    category: String,
    status: String,
    customer_email: String,
    start_date: i64,
    renewal_date: i64,
    reminder_offsets: Vec<i64>,
    reminders: Json<Vec<Reminder>>,
    created: i64,
    updated: i64,
}

impl TryFrom<SubscriptionRaw> for Subscription {
    type Error = anyhow::Error;

    fn try_from(raw: SubscriptionRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.subscription_uid.into(),
            user_id: raw.user_uid.into(),
            name: raw.name,
            price: raw.price,
            currency: raw.currency.parse()?,
            frequency: raw.frequency.parse()?,
            category: raw.category.parse()?,
            status: raw.status.parse()?,
            customer_email: raw.customer_email,
            start_date: raw.start_date,
            renewal_date: raw.renewal_date,
            reminder_offsets: raw.reminder_offsets,
            reminders: raw.reminders.0,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn to_domain(raw: SubscriptionRaw) -> Option<Subscription> {
    let subscription_uid = raw.subscription_uid;
    match raw.try_into() {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            error!(
                "Stored subscription: {} could not be read. Error: {:?}",
                subscription_uid, e
            );
            None
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for PostgresSubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
            (subscription_uid, user_uid, name, price, currency, frequency, category, status,
             customer_email, start_date, renewal_date, reminder_offsets, reminders, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(subscription.id.inner_ref())
        .bind(subscription.user_id.inner_ref())
        .bind(&subscription.name)
        .bind(subscription.price)
        .bind(subscription.currency.as_str())
        .bind(subscription.frequency.as_str())
        .bind(subscription.category.as_str())
        .bind(subscription.status.as_str())
        .bind(&subscription.customer_email)
        .bind(subscription.start_date)
        .bind(subscription.renewal_date)
        .bind(&subscription.reminder_offsets)
        .bind(Json(&subscription.reminders))
        .bind(subscription.created)
        .bind(subscription.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert subscription: {:?}. DB returned error: {:?}",
                subscription, e
            );
            e
        })?;
        Ok(())
    }

    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()> {
        // One statement, so the reminder list is replaced atomically
        let res = sqlx::query(
            r#"
            UPDATE subscriptions
            SET name = $2,
            price = $3,
            currency = $4,
            frequency = $5,
            category = $6,
            status = $7,
            customer_email = $8,
            start_date = $9,
            renewal_date = $10,
            reminder_offsets = $11,
            reminders = $12,
            updated = $13
            WHERE subscription_uid = $1
            "#,
        )
        .bind(subscription.id.inner_ref())
        .bind(&subscription.name)
        .bind(subscription.price)
        .bind(subscription.currency.as_str())
        .bind(subscription.frequency.as_str())
        .bind(subscription.category.as_str())
        .bind(subscription.status.as_str())
        .bind(&subscription.customer_email)
        .bind(subscription.start_date)
        .bind(subscription.renewal_date)
        .bind(&subscription.reminder_offsets)
        .bind(Json(&subscription.reminders))
        .bind(subscription.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to save subscription: {:?}. DB returned error: {:?}",
                subscription, e
            );
            e
        })?;

        if res.rows_affected() == 0 {
            return Err(anyhow::anyhow!(
                "Subscription with id: {} was not found",
                subscription.id
            ));
        }
        Ok(())
    }

    async fn save_reminders(&self, subscription_id: &ID, reminders: &[Reminder]) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE subscriptions
            SET reminders = $2
            WHERE subscription_uid = $1
            "#,
        )
        .bind(subscription_id.inner_ref())
        .bind(Json(reminders))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to save reminders of subscription: {}. DB returned error: {:?}",
                subscription_id, e
            );
            e
        })?;

        if res.rows_affected() == 0 {
            return Err(anyhow::anyhow!(
                "Subscription with id: {} was not found",
                subscription_id
            ));
        }
        Ok(())
    }

    async fn find(&self, subscription_id: &ID) -> Option<Subscription> {
        let raw = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find subscription with id: {} failed. DB returned error: {:?}",
                subscription_id, e
            );
            e
        })
        .ok()??;

        to_domain(raw)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Subscription> {
        sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.user_uid = $1
            ORDER BY s.created
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find subscriptions for user: {} failed. DB returned error: {:?}",
                user_id, e
            );
            e
        })
        .unwrap_or_default()
        .into_iter()
        .filter_map(to_domain)
        .collect()
    }

    async fn delete(&self, subscription_id: &ID) -> Option<Subscription> {
        let raw = sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            DELETE FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            RETURNING *
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Delete subscription with id: {} failed. DB returned error: {:?}",
                subscription_id, e
            );
            e
        })
        .ok()??;

        to_domain(raw)
    }
}
