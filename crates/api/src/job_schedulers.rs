use crate::{
    shared::usecase::execute,
    subscription::deliver_reminder::{DeliverReminderUseCase, DeliveryOutcome},
};
use actix_web::rt::time::interval;
use futures::{stream, StreamExt};
use renewal_reminders_domain::ReminderJob;
use renewal_reminders_infra::{FailOutcome, QueuedJob, RenewalContext};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What happened to the jobs handled by one run of the reminder worker
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JobRunSummary {
    pub claimed: usize,
    pub sent: usize,
    pub discarded: usize,
    pub retrying: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum JobResult {
    Sent,
    Discarded,
    Retrying,
    Dropped,
}

impl JobRunSummary {
    fn record(&mut self, result: JobResult) {
        match result {
            JobResult::Sent => self.sent += 1,
            JobResult::Discarded => self.discarded += 1,
            JobResult::Retrying => self.retrying += 1,
            JobResult::Dropped => self.dropped += 1,
        }
    }
}

/// Polls the reminder queue for the rest of the lifetime of the server
pub fn start_reminder_worker(ctx: RenewalContext) {
    actix_web::rt::spawn(async move {
        info!(
            "Starting reminder worker with concurrency: {}",
            ctx.config.worker_concurrency
        );
        let mut interval = interval(Duration::from_millis(ctx.config.poll_interval_millis));
        loop {
            interval.tick().await;
            let summary = run_due_jobs(&ctx).await;
            if summary.claimed > 0 {
                debug!("Reminder worker run: {:?}", summary);
            }
        }
    });
}

/// Processes every job that is due, at most `worker_concurrency` of them at a time
pub async fn run_due_jobs(ctx: &RenewalContext) -> JobRunSummary {
    let limit = std::cmp::max(ctx.config.worker_concurrency, 1);
    let mut summary = JobRunSummary::default();

    loop {
        let now = ctx.sys.get_timestamp_millis();
        let jobs = match ctx.queue.claim_due(now, limit).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Unable to claim due reminder jobs. Error: {:?}", e);
                break;
            }
        };
        let claimed = jobs.len();
        summary.claimed += claimed;

        let results = stream::iter(jobs)
            .map(|job| process_job(job, ctx))
            .buffer_unordered(limit)
            .collect::<Vec<_>>()
            .await;
        for result in results {
            summary.record(result);
        }

        if claimed < limit {
            break;
        }
    }

    summary
}

async fn process_job(job: QueuedJob, ctx: &RenewalContext) -> JobResult {
    let reminder_job = match ReminderJob::from_payload(&job.payload) {
        Ok(reminder_job) => reminder_job,
        Err(e) => {
            error!("Discarding job: {} with invalid payload. Error: {}", job.job_id, e);
            if let Err(e) = ctx.queue.discard(&job.job_id).await {
                error!("Unable to discard job: {}. Error: {:?}", job.job_id, e);
            }
            return JobResult::Discarded;
        }
    };

    let usecase = DeliverReminderUseCase::new(job.job_id.clone(), reminder_job);
    match execute(usecase, ctx).await {
        Ok(outcome) => {
            if let Err(e) = ctx.queue.complete(&job.job_id).await {
                error!("Unable to complete job: {}. Error: {:?}", job.job_id, e);
            }
            match outcome {
                DeliveryOutcome::Sent => JobResult::Sent,
                DeliveryOutcome::Discarded(_) => JobResult::Discarded,
            }
        }
        Err(e) => {
            let now = ctx.sys.get_timestamp_millis();
            match ctx.queue.fail(&job.job_id, now, &format!("{:?}", e)).await {
                Ok(FailOutcome::Retrying { run_at }) => {
                    warn!(
                        "Job: {} failed on attempt {}/{}, retrying at: {}",
                        job.job_id, job.attempts_made, job.options.max_attempts, run_at
                    );
                    JobResult::Retrying
                }
                Ok(FailOutcome::Dropped) => {
                    // Nothing re-enqueues the job, the reminder stays SCHEDULED
                    error!(
                        "Job: {} failed after {} attempts and was dropped. Last error: {:?}",
                        job.job_id, job.attempts_made, e
                    );
                    JobResult::Dropped
                }
                Err(err) => {
                    error!("Unable to record failure of job: {}. Error: {:?}", job.job_id, err);
                    JobResult::Retrying
                }
            }
        }
    }
}
