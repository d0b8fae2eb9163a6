use crate::error::RenewalError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::reschedule_subscription_reminders::{APIResponse, PathParams};
use renewal_reminders_domain::{
    is_valid_reminder_offset, JobOptions, Reminder, ReminderJob, ReminderStatus, Subscription, ID,
};
use renewal_reminders_infra::{EnqueueResult, RemoveResult, RenewalContext};
use tracing::{debug, info, warn};

pub async fn reschedule_reminders_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<RenewalContext>,
) -> Result<HttpResponse, RenewalError> {
    let usecase = RescheduleRemindersUseCase {
        subscription_id: path.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(RenewalError::from)
}

/// Rebuilds the reminders of a `Subscription` for its current renewal cycle.
///
/// Every pending delivery job is withdrawn from the queue and one job per
/// reminder offset is enqueued. The reminder list of the `Subscription` is
/// replaced as a whole while the rest of the stored `Subscription` is left
/// untouched. Running it twice for the same cycle leaves the queue
/// with exactly one job per offset.
///
/// Responds with `None` when the `Subscription` does not take reminders
/// anymore, in that case nothing is changed.
#[derive(Debug)]
pub struct RescheduleRemindersUseCase {
    pub subscription_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    QueueError,
    StorageError,
}

impl From<UseCaseError> for RenewalError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(subscription_id) => Self::NotFound(format!(
                "The subscription with id: {}, was not found.",
                subscription_id
            )),
            UseCaseError::QueueError => {
                Self::Unavailable("Unable to schedule the reminders at the moment.".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RescheduleRemindersUseCase {
    type Response = Option<Vec<Reminder>>;

    type Error = UseCaseError;

    const NAME: &'static str = "RescheduleReminders";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        let mut subscription = match ctx.repos.subscriptions.find(&self.subscription_id).await {
            Some(subscription) => subscription,
            None => return Err(UseCaseError::NotFound(self.subscription_id.clone())),
        };

        let now = ctx.sys.get_timestamp_millis();
        if !subscription.accepts_reminders(now) {
            info!(
                "Subscription: {} with status: {} renewing at: {} does not accept reminders, skipping",
                subscription.id, subscription.status, subscription.renewal_date
            );
            return Ok(None);
        }

        cancel_pending_reminders(&mut subscription, ctx).await;
        let reminders = schedule_reminders(&subscription, now, ctx).await?;

        ctx.repos
            .subscriptions
            .save_reminders(&subscription.id, &reminders)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(Some(reminders))
    }
}

/// Withdraws the delivery jobs of every `SCHEDULED` reminder and cancels it.
/// Jobs that are already running or gone are left alone, the worker discards
/// them once it sees the new reminder list.
async fn cancel_pending_reminders(subscription: &mut Subscription, ctx: &RenewalContext) {
    for reminder in subscription.reminders.iter_mut().filter(|r| r.is_scheduled()) {
        match ctx.queue.remove(&reminder.job_id).await {
            Ok(RemoveResult::Removed) => {}
            Ok(res) => debug!("Job: {} was not removed: {:?}", reminder.job_id, res),
            Err(e) => warn!("Unable to remove job: {}. Error: {:?}", reminder.job_id, e),
        }
        reminder.cancel();
    }
}

async fn schedule_reminders(
    subscription: &Subscription,
    now: i64,
    ctx: &RenewalContext,
) -> Result<Vec<Reminder>, UseCaseError> {
    let offsets = subscription.effective_reminder_offsets();
    let mut reminders: Vec<Reminder> = Vec::with_capacity(offsets.len());

    for offset_days in offsets {
        if !is_valid_reminder_offset(*offset_days) {
            warn!(
                "Skipping invalid reminder offset: {} of subscription: {}",
                offset_days, subscription.id
            );
            continue;
        }
        if reminders.iter().any(|r| r.offset_days == *offset_days) {
            continue;
        }

        let reminder = Reminder::scheduled(&subscription.id, subscription.renewal_date, *offset_days);

        // Already delivered for this cycle
        let sent = subscription
            .reminders
            .iter()
            .find(|r| r.job_id == reminder.job_id && r.status == ReminderStatus::Sent);
        if let Some(sent) = sent {
            reminders.push(sent.clone());
            continue;
        }

        let job = ReminderJob::SendReminder {
            subscription_id: subscription.id.clone(),
            offset_days: *offset_days,
        };
        let options = JobOptions::reminder_delivery(reminder.job_id.clone(), reminder.delay_millis(now));
        match ctx.queue.enqueue(&job, &options, now).await {
            Ok(EnqueueResult::Enqueued) => {}
            Ok(EnqueueResult::Duplicate) => {
                debug!("Job: {} is already on the queue", reminder.job_id)
            }
            Err(e) => {
                warn!("Unable to enqueue job: {}. Error: {:?}", reminder.job_id, e);
                return Err(UseCaseError::QueueError);
            }
        }

        reminders.push(reminder);
    }

    Ok(reminders)
}
