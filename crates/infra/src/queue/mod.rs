mod inmemory;
mod postgres;

pub use inmemory::InMemoryJobQueue;
pub use postgres::PostgresJobQueue;
use renewal_reminders_domain::{JobOptions, ReminderJob};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Waiting for `run_at` to pass
    Waiting,
    /// Claimed by a worker
    Active,
    /// Only kept when the job was not configured with `remove_on_success`
    Completed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// A job as it is stored in the queue
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub job_id: String,
    /// Raw payload, validated by the consumer when the job is dequeued
    pub payload: serde_json::Value,
    pub run_at: i64,
    pub attempts_made: i32,
    pub options: JobOptions,
    pub state: JobState,
    pub locked_at: Option<i64>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueResult {
    Enqueued,
    /// A job with the same id already exists, nothing was changed
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveResult {
    Removed,
    NotFound,
    /// The job is being processed and can not be removed anymore
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    Retrying { run_at: i64 },
    /// No attempts left, the job was dropped
    Dropped,
}

/// Durable delayed job queue with deduplication by job id and retries with backoff
#[async_trait::async_trait]
pub trait IJobQueue: Send + Sync {
    async fn enqueue(
        &self,
        job: &ReminderJob,
        options: &JobOptions,
        now: i64,
    ) -> anyhow::Result<EnqueueResult>;
    async fn remove(&self, job_id: &str) -> anyhow::Result<RemoveResult>;
    async fn find(&self, job_id: &str) -> Option<QueuedJob>;
    /// Marks at most `limit` due jobs as active and returns them. Jobs that have
    /// been active for longer than the lock timeout are handed out again.
    async fn claim_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<QueuedJob>>;
    async fn complete(&self, job_id: &str) -> anyhow::Result<()>;
    async fn fail(&self, job_id: &str, now: i64, reason: &str) -> anyhow::Result<FailOutcome>;
    /// Drops the job without any further attempts
    async fn discard(&self, job_id: &str) -> anyhow::Result<()>;
}
