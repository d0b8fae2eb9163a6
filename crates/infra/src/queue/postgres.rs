use super::{EnqueueResult, FailOutcome, IJobQueue, JobState, QueuedJob, RemoveResult};
use renewal_reminders_domain::{Backoff, JobOptions, ReminderJob};
use sqlx::{types::Json, FromRow, PgPool};
use tracing::error;

/// Job queue backed by the `reminder_jobs` table.
///
/// The primary key on `job_id` gives deduplication and `FOR UPDATE SKIP LOCKED`
/// lets several worker processes claim jobs from the same table.
pub struct PostgresJobQueue {
    pool: PgPool,
    lock_timeout_millis: i64,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool, lock_timeout_millis: i64) -> Self {
        Self {
            pool,
            lock_timeout_millis,
        }
    }
}

#[derive(Debug, FromRow)]
struct QueuedJobRaw {
    job_id: String,
    payload: serde_json::Value,
    run_at: i64,
    attempts_made: i32,
    max_attempts: i32,
    backoff: Json<Backoff>,
    remove_on_success: bool,
    delay_millis: i64,
    state: String,
    locked_at: Option<i64>,
    last_error: Option<String>,
}

impl From<QueuedJobRaw> for QueuedJob {
    fn from(raw: QueuedJobRaw) -> Self {
        let state = match raw.state.as_str() {
            "active" => JobState::Active,
            "completed" => JobState::Completed,
            _ => JobState::Waiting,
        };
        Self {
            options: JobOptions {
                job_id: raw.job_id.clone(),
                delay_millis: raw.delay_millis,
                max_attempts: raw.max_attempts,
                backoff: raw.backoff.0,
                remove_on_success: raw.remove_on_success,
            },
            job_id: raw.job_id,
            payload: raw.payload,
            run_at: raw.run_at,
            attempts_made: raw.attempts_made,
            state,
            locked_at: raw.locked_at,
            last_error: raw.last_error,
        }
    }
}

#[async_trait::async_trait]
impl IJobQueue for PostgresJobQueue {
    async fn enqueue(
        &self,
        job: &ReminderJob,
        options: &JobOptions,
        now: i64,
    ) -> anyhow::Result<EnqueueResult> {
        let res = sqlx::query(
            r#"
            INSERT INTO reminder_jobs
            (job_id, name, payload, run_at, attempts_made, max_attempts, backoff,
             remove_on_success, delay_millis, state, created)
            VALUES($1, $2, $3, $4, 0, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (job_id) DO NOTHING
            "#,
        )
        .bind(&options.job_id)
        .bind(job.name())
        .bind(job.to_payload()?)
        .bind(now.saturating_add(std::cmp::max(0, options.delay_millis)))
        .bind(options.max_attempts)
        .bind(Json(&options.backoff))
        .bind(options.remove_on_success)
        .bind(options.delay_millis)
        .bind(JobState::Waiting.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to enqueue job: {}. DB returned error: {:?}",
                options.job_id, e
            );
            e
        })?;

        if res.rows_affected() == 0 {
            Ok(EnqueueResult::Duplicate)
        } else {
            Ok(EnqueueResult::Enqueued)
        }
    }

    async fn remove(&self, job_id: &str) -> anyhow::Result<RemoveResult> {
        let removed = sqlx::query(
            r#"
            DELETE FROM reminder_jobs AS j
            WHERE j.job_id = $1 AND j.state <> 'active'
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        if removed.rows_affected() > 0 {
            return Ok(RemoveResult::Removed);
        }

        match self.find(job_id).await {
            Some(_) => Ok(RemoveResult::Active),
            None => Ok(RemoveResult::NotFound),
        }
    }

    async fn find(&self, job_id: &str) -> Option<QueuedJob> {
        sqlx::query_as::<_, QueuedJobRaw>(
            r#"
            SELECT * FROM reminder_jobs AS j
            WHERE j.job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find job: {} failed. DB returned error: {:?}", job_id, e);
            e
        })
        .ok()?
        .map(QueuedJob::from)
    }

    async fn claim_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<QueuedJob>> {
        let jobs = sqlx::query_as::<_, QueuedJobRaw>(
            r#"
            UPDATE reminder_jobs AS j
            SET state = 'active',
            locked_at = $1,
            attempts_made = j.attempts_made + 1
            WHERE j.job_id IN (
                SELECT job_id FROM reminder_jobs
                WHERE (state = 'waiting' AND run_at <= $1)
                OR (state = 'active' AND locked_at <= $1 - $2)
                ORDER BY run_at
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(self.lock_timeout_millis)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut jobs = jobs.into_iter().map(QueuedJob::from).collect::<Vec<_>>();
        jobs.sort_by_key(|job| job.run_at);
        Ok(jobs)
    }

    async fn complete(&self, job_id: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM reminder_jobs AS j
            WHERE j.job_id = $1 AND j.remove_on_success
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            UPDATE reminder_jobs
            SET state = 'completed', locked_at = NULL
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail(&self, job_id: &str, now: i64, reason: &str) -> anyhow::Result<FailOutcome> {
        let job = match self.find(job_id).await {
            Some(job) => job,
            None => return Ok(FailOutcome::Dropped),
        };
        if job.attempts_made >= job.options.max_attempts {
            self.discard(job_id).await?;
            return Ok(FailOutcome::Dropped);
        }

        let run_at = now.saturating_add(job.options.backoff.delay_for_attempt(job.attempts_made));
        sqlx::query(
            r#"
            UPDATE reminder_jobs
            SET state = 'waiting', locked_at = NULL, run_at = $2, last_error = $3
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .bind(run_at)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(FailOutcome::Retrying { run_at })
    }

    async fn discard(&self, job_id: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM reminder_jobs AS j
            WHERE j.job_id = $1
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
