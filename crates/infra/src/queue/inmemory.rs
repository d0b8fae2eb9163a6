use super::{EnqueueResult, FailOutcome, IJobQueue, JobState, QueuedJob, RemoveResult};
use renewal_reminders_domain::{JobOptions, ReminderJob};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub struct InMemoryJobQueue {
    jobs: Mutex<HashMap<String, QueuedJob>>,
    lock_timeout_millis: i64,
}

impl InMemoryJobQueue {
    pub fn new(lock_timeout_millis: i64) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            lock_timeout_millis,
        }
    }

    fn jobs(&self) -> anyhow::Result<MutexGuard<'_, HashMap<String, QueuedJob>>> {
        self.jobs
            .lock()
            .map_err(|_| anyhow::anyhow!("Inmemory job queue lock was poisoned"))
    }

    fn is_claimable(&self, job: &QueuedJob, now: i64) -> bool {
        match job.state {
            JobState::Waiting => job.run_at <= now,
            JobState::Active => match job.locked_at {
                Some(locked_at) => now - locked_at >= self.lock_timeout_millis,
                None => true,
            },
            JobState::Completed => false,
        }
    }
}

#[async_trait::async_trait]
impl IJobQueue for InMemoryJobQueue {
    async fn enqueue(
        &self,
        job: &ReminderJob,
        options: &JobOptions,
        now: i64,
    ) -> anyhow::Result<EnqueueResult> {
        let mut jobs = self.jobs()?;
        if jobs.contains_key(&options.job_id) {
            return Ok(EnqueueResult::Duplicate);
        }
        jobs.insert(
            options.job_id.clone(),
            QueuedJob {
                job_id: options.job_id.clone(),
                payload: job.to_payload()?,
                run_at: now.saturating_add(std::cmp::max(0, options.delay_millis)),
                attempts_made: 0,
                options: options.clone(),
                state: JobState::Waiting,
                locked_at: None,
                last_error: None,
            },
        );
        Ok(EnqueueResult::Enqueued)
    }

    async fn remove(&self, job_id: &str) -> anyhow::Result<RemoveResult> {
        let mut jobs = self.jobs()?;
        let res = match jobs.get(job_id) {
            None => RemoveResult::NotFound,
            Some(job) if job.state == JobState::Active => RemoveResult::Active,
            Some(_) => {
                jobs.remove(job_id);
                RemoveResult::Removed
            }
        };
        Ok(res)
    }

    async fn find(&self, job_id: &str) -> Option<QueuedJob> {
        self.jobs().ok()?.get(job_id).cloned()
    }

    async fn claim_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<QueuedJob>> {
        let mut jobs = self.jobs()?;
        let mut due = jobs
            .values()
            .filter(|job| self.is_claimable(job, now))
            .map(|job| (job.run_at, job.job_id.clone()))
            .collect::<Vec<_>>();
        due.sort();

        let mut claimed = Vec::with_capacity(std::cmp::min(limit, due.len()));
        for (_, job_id) in due.into_iter().take(limit) {
            if let Some(job) = jobs.get_mut(&job_id) {
                job.state = JobState::Active;
                job.locked_at = Some(now);
                job.attempts_made += 1;
                claimed.push(job.clone());
            }
        }
        Ok(claimed)
    }

    async fn complete(&self, job_id: &str) -> anyhow::Result<()> {
        let mut jobs = self.jobs()?;
        let remove = match jobs.get_mut(job_id) {
            Some(job) if job.options.remove_on_success => true,
            Some(job) => {
                job.state = JobState::Completed;
                job.locked_at = None;
                false
            }
            None => false,
        };
        if remove {
            jobs.remove(job_id);
        }
        Ok(())
    }

    async fn fail(&self, job_id: &str, now: i64, reason: &str) -> anyhow::Result<FailOutcome> {
        let mut jobs = self.jobs()?;
        let job = match jobs.get_mut(job_id) {
            Some(job) => job,
            None => return Ok(FailOutcome::Dropped),
        };
        if job.attempts_made >= job.options.max_attempts {
            jobs.remove(job_id);
            return Ok(FailOutcome::Dropped);
        }

        let run_at = now.saturating_add(job.options.backoff.delay_for_attempt(job.attempts_made));
        job.run_at = run_at;
        job.state = JobState::Waiting;
        job.locked_at = None;
        job.last_error = Some(reason.to_string());
        Ok(FailOutcome::Retrying { run_at })
    }

    async fn discard(&self, job_id: &str) -> anyhow::Result<()> {
        self.jobs()?.remove(job_id);
        Ok(())
    }
}
