use super::create_subscription::{self, validate_email, validate_name, validate_price};
use super::reschedule_reminders::{self, RescheduleRemindersUseCase};
use crate::error::RenewalError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::update_subscription::{APIResponse, PathParams, RequestBody};
use renewal_reminders_domain::{
    is_expired, normalize_reminder_offsets, InvalidSubscriptionError, Subscription,
    SubscriptionStatus, ID,
};
use renewal_reminders_infra::RenewalContext;

pub async fn update_subscription_controller(
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<RenewalContext>,
) -> Result<HttpResponse, RenewalError> {
    let body = body.0;
    let usecase = UpdateSubscriptionUseCase {
        subscription_id: path.subscription_id.clone(),
        name: body.name,
        price: body.price,
        customer_email: body.customer_email,
        renewal_date: body.renewal_date,
        reminder_offsets: body.reminder_offsets,
        status: body.status,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(RenewalError::from)
}

/// Changing the renewal date, the reminder offsets or the status reschedules
/// the reminders of the `Subscription`
#[derive(Debug, Default)]
pub struct UpdateSubscriptionUseCase {
    pub subscription_id: ID,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub customer_email: Option<String>,
    pub renewal_date: Option<i64>,
    pub reminder_offsets: Option<Vec<i64>>,
    pub status: Option<SubscriptionStatus>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidInput(create_subscription::UseCaseError),
    InvalidRenewalDate,
    InvalidReminderOffsets(InvalidSubscriptionError),
    StorageError,
    ScheduleReminders(reschedule_reminders::UseCaseError),
}

impl From<UseCaseError> for RenewalError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(subscription_id) => Self::NotFound(format!(
                "The subscription with id: {}, was not found.",
                subscription_id
            )),
            UseCaseError::InvalidInput(e) => e.into(),
            UseCaseError::InvalidRenewalDate => {
                Self::BadClientData("The renewal date must be after the start date.".into())
            }
            UseCaseError::InvalidReminderOffsets(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::ScheduleReminders(e) => e.into(),
        }
    }
}

impl From<create_subscription::UseCaseError> for UseCaseError {
    fn from(e: create_subscription::UseCaseError) -> Self {
        Self::InvalidInput(e)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateSubscription";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        let mut subscription = match ctx.repos.subscriptions.find(&self.subscription_id).await {
            Some(subscription) => subscription,
            None => return Err(UseCaseError::NotFound(self.subscription_id.clone())),
        };

        if let Some(name) = &self.name {
            subscription.name = validate_name(name)?;
        }
        if let Some(price) = self.price {
            subscription.price = validate_price(price)?;
        }
        if let Some(email) = &self.customer_email {
            subscription.customer_email = validate_email(email)?;
        }

        let mut reschedule_needed = false;
        if let Some(renewal_date) = self.renewal_date {
            if renewal_date <= subscription.start_date {
                return Err(UseCaseError::InvalidRenewalDate);
            }
            reschedule_needed |= renewal_date != subscription.renewal_date;
            subscription.renewal_date = renewal_date;
        }
        if let Some(offsets) = &self.reminder_offsets {
            let offsets = normalize_reminder_offsets(offsets.clone())
                .map_err(UseCaseError::InvalidReminderOffsets)?;
            reschedule_needed |= offsets != subscription.reminder_offsets;
            subscription.reminder_offsets = offsets;
        }
        if let Some(status) = self.status {
            reschedule_needed |= status != subscription.status;
            subscription.status = status;
        }

        let now = ctx.sys.get_timestamp_millis();
        if subscription.is_active() && is_expired(subscription.renewal_date, now) {
            subscription.status = SubscriptionStatus::Expired;
        }
        subscription.updated = now;

        ctx.repos
            .subscriptions
            .save(&subscription)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        if reschedule_needed {
            let reschedule = RescheduleRemindersUseCase {
                subscription_id: subscription.id.clone(),
            };
            if let Some(reminders) = execute(reschedule, ctx)
                .await
                .map_err(UseCaseError::ScheduleReminders)?
            {
                subscription.replace_reminders(reminders);
            }
        }

        Ok(subscription)
    }
}
