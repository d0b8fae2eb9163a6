use crate::shared::usecase::UseCase;
use renewal_reminders_domain::{ReminderJob, ReminderMessage, ID};
use renewal_reminders_infra::RenewalContext;
use tracing::info;

/// Sends the reminder a dequeued `SendReminder` job points at and marks it as `SENT`.
///
/// The job only carries the subscription id and the offset. Everything else is
/// reloaded, so jobs that outlived their `Subscription`, its status or its
/// renewal cycle are discarded instead of delivered. A reminder is only
/// delivered by the job with its exact `job_id`.
#[derive(Debug)]
pub struct DeliverReminderUseCase {
    pub job_id: String,
    pub subscription_id: ID,
    pub offset_days: i64,
}

impl DeliverReminderUseCase {
    pub fn new(job_id: String, job: ReminderJob) -> Self {
        match job {
            ReminderJob::SendReminder {
                subscription_id,
                offset_days,
            } => Self {
                job_id,
                subscription_id,
                offset_days,
            },
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DiscardReason {
    SubscriptionNotFound,
    Inactive,
    RenewalPassed,
    NoScheduledReminder,
}

#[derive(Debug, PartialEq)]
pub enum DeliveryOutcome {
    Sent,
    Discarded(DiscardReason),
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    SendFailed(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeliverReminderUseCase {
    type Response = DeliveryOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "DeliverReminder";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        let mut subscription = match ctx.repos.subscriptions.find(&self.subscription_id).await {
            Some(subscription) => subscription,
            None => return Ok(self.discard(DiscardReason::SubscriptionNotFound)),
        };
        if !subscription.is_active() {
            return Ok(self.discard(DiscardReason::Inactive));
        }
        if subscription.renewal_date <= ctx.sys.get_timestamp_millis() {
            return Ok(self.discard(DiscardReason::RenewalPassed));
        }
        // Already sent, cancelled or superseded by a reschedule
        if subscription.scheduled_reminder_mut(&self.job_id).is_none() {
            return Ok(self.discard(DiscardReason::NoScheduledReminder));
        }

        let message = ReminderMessage::renewal_reminder(
            &subscription,
            self.offset_days,
            &ctx.config.manage_subscription_url,
        );
        ctx.notifier
            .send(&message)
            .await
            .map_err(|e| UseCaseError::SendFailed(e.to_string()))?;

        let now = ctx.sys.get_timestamp_millis();
        if let Some(reminder) = subscription.scheduled_reminder_mut(&self.job_id) {
            reminder.mark_sent(now);
        }
        ctx.repos
            .subscriptions
            .save_reminders(&subscription.id, &subscription.reminders)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(DeliveryOutcome::Sent)
    }
}

impl DeliverReminderUseCase {
    fn discard(&self, reason: DiscardReason) -> DeliveryOutcome {
        info!(
            "Discarding job: {} for subscription: {}. Reason: {:?}",
            self.job_id, self.subscription_id, reason
        );
        DeliveryOutcome::Discarded(reason)
    }
}
