use crate::error::RenewalError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::delete_subscription::{APIResponse, PathParams};
use renewal_reminders_domain::{Subscription, ID};
use renewal_reminders_infra::{RemoveResult, RenewalContext};
use tracing::{debug, warn};

pub async fn delete_subscription_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<RenewalContext>,
) -> Result<HttpResponse, RenewalError> {
    let usecase = DeleteSubscriptionUseCase {
        subscription_id: path.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(RenewalError::from)
}

/// Deletes a `Subscription` and withdraws the delivery jobs of its pending
/// reminders. Jobs that are already running find no `Subscription` and are
/// discarded by the worker.
#[derive(Debug)]
struct DeleteSubscriptionUseCase {
    pub subscription_id: ID,
}

#[derive(Debug, PartialEq)]
enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for RenewalError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(subscription_id) => Self::NotFound(format!(
                "The subscription with id: {}, was not found.",
                subscription_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteSubscription";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        let subscription = ctx
            .repos
            .subscriptions
            .delete(&self.subscription_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.subscription_id.clone()))?;

        for reminder in subscription.reminders.iter().filter(|r| r.is_scheduled()) {
            match ctx.queue.remove(&reminder.job_id).await {
                Ok(RemoveResult::Removed) => {}
                Ok(res) => debug!("Job: {} was not removed: {:?}", reminder.job_id, res),
                Err(e) => warn!("Unable to remove job: {}. Error: {:?}", reminder.job_id, e),
            }
        }

        Ok(subscription)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::testing::{insert_subscription, setup, subscription_factory, NOW};
    use crate::subscription::deliver_reminder::{
        DeliverReminderUseCase, DeliveryOutcome, DiscardReason,
    };
    use crate::subscription::reschedule_reminders::RescheduleRemindersUseCase;
    use renewal_reminders_domain::{ReminderJob, DAY_MILLIS};

    #[actix_web::test]
    async fn deletes_subscription_and_withdraws_its_jobs() {
        let t = setup();
        let subscription = subscription_factory(10, vec![7, 1]);
        insert_subscription(&t.ctx, &subscription).await;
        let mut reschedule = RescheduleRemindersUseCase {
            subscription_id: subscription.id.clone(),
        };
        let reminders = reschedule.execute(&t.ctx).await.unwrap().unwrap();

        let mut usecase = DeleteSubscriptionUseCase {
            subscription_id: subscription.id.clone(),
        };
        let deleted = usecase.execute(&t.ctx).await.expect("To delete");
        assert_eq!(deleted.id, subscription.id);
        assert_eq!(deleted.reminders, reminders);

        assert!(t.ctx.repos.subscriptions.find(&subscription.id).await.is_none());
        for reminder in &reminders {
            assert!(t.ctx.queue.find(&reminder.job_id).await.is_none());
        }
    }

    #[actix_web::test]
    async fn running_jobs_of_deleted_subscriptions_are_discarded() {
        let t = setup();
        let subscription = subscription_factory(10, vec![7]);
        insert_subscription(&t.ctx, &subscription).await;
        let mut reschedule = RescheduleRemindersUseCase {
            subscription_id: subscription.id.clone(),
        };
        reschedule.execute(&t.ctx).await.unwrap();

        t.sys.advance(3 * DAY_MILLIS);
        let running = t
            .ctx
            .queue
            .claim_due(NOW + 3 * DAY_MILLIS, 1)
            .await
            .unwrap()
            .remove(0);

        let mut usecase = DeleteSubscriptionUseCase {
            subscription_id: subscription.id.clone(),
        };
        usecase.execute(&t.ctx).await.expect("To delete");
        assert!(t.ctx.queue.find(&running.job_id).await.is_some());

        let job = ReminderJob::from_payload(&running.payload).unwrap();
        let mut deliver = DeliverReminderUseCase::new(running.job_id.clone(), job);
        assert_eq!(
            deliver.execute(&t.ctx).await,
            Ok(DeliveryOutcome::Discarded(DiscardReason::SubscriptionNotFound))
        );
        assert!(t.notifier.sent().is_empty());
    }

    #[actix_web::test]
    async fn rejects_unknown_subscription() {
        let t = setup();
        let subscription_id = ID::new();
        let mut usecase = DeleteSubscriptionUseCase {
            subscription_id: subscription_id.clone(),
        };
        assert_eq!(
            usecase.execute(&t.ctx).await.unwrap_err(),
            UseCaseError::NotFound(subscription_id)
        );
    }
}
