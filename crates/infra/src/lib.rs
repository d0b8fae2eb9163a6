mod config;
mod queue;
mod repos;
mod services;
mod system;

pub use config::{Config, NotifierConfig, SmtpConfig, WebhookConfig};
pub use queue::{
    EnqueueResult, FailOutcome, IJobQueue, InMemoryJobQueue, JobState, PostgresJobQueue,
    QueuedJob, RemoveResult,
};
pub use repos::{ISubscriptionRepo, Repos};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
pub use system::{ISys, MockSys, RealSys};
use tracing::info;

/// Everything the use cases need to talk to the outside world
#[derive(Clone)]
pub struct RenewalContext {
    pub repos: Repos,
    pub queue: Arc<dyn IJobQueue>,
    pub notifier: Arc<dyn INotifier>,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl RenewalContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new();
        let pool = connect(&params.postgres_connection_string).await?;
        info!("Connected to postgres");

        Ok(Self {
            repos: Repos::create_postgres(pool.clone()),
            queue: Arc::new(PostgresJobQueue::new(pool, config.job_lock_timeout_millis)),
            notifier: create_notifier(&config.notifier)?,
            config,
            sys: Arc::new(RealSys {}),
        })
    }

    pub fn create_inmemory() -> Self {
        let config = Config::new();
        Self {
            repos: Repos::create_inmemory(),
            queue: Arc::new(InMemoryJobQueue::new(config.job_lock_timeout_millis)),
            notifier: Arc::new(InMemoryNotifier::new()),
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<RenewalContext> {
    RenewalContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .map_err(|_| anyhow::anyhow!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

async fn connect(connection_string: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(connection_string)
        .await?;
    Ok(pool)
}

pub async fn run_migration() -> anyhow::Result<()> {
    let pool = connect(&get_psql_connection_string()?).await?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e: MigrateError| anyhow::anyhow!("Unable to run migrations: {}", e))
}
