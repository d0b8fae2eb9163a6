use super::reschedule_reminders::{self, RescheduleRemindersUseCase};
use crate::error::RenewalError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::create_subscription::{APIResponse, RequestBody};
use renewal_reminders_domain::{
    derive_renewal_date, is_expired, normalize_reminder_offsets, Category, Currency, Frequency,
    InvalidSubscriptionError, Subscription, SubscriptionStatus, DEFAULT_REMINDER_OFFSETS, ID,
};
use renewal_reminders_infra::RenewalContext;

pub async fn create_subscription_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<RenewalContext>,
) -> Result<HttpResponse, RenewalError> {
    let body = body.0;
    let usecase = CreateSubscriptionUseCase {
        user_id: body.user_id,
        name: body.name,
        price: body.price,
        currency: body.currency.unwrap_or_default(),
        frequency: body.frequency,
        category: body.category,
        customer_email: body.customer_email,
        start_date: body.start_date,
        renewal_date: body.renewal_date,
        reminder_offsets: body.reminder_offsets,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Created().json(APIResponse::new(subscription)))
        .map_err(RenewalError::from)
}

#[derive(Debug)]
pub struct CreateSubscriptionUseCase {
    pub user_id: ID,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub customer_email: String,
    pub start_date: i64,
    pub renewal_date: Option<i64>,
    pub reminder_offsets: Option<Vec<i64>>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidName,
    InvalidPrice(f64),
    InvalidEmail(String),
    InvalidRenewalDate,
    InvalidReminderOffsets(InvalidSubscriptionError),
    StorageError,
    ScheduleReminders(reschedule_reminders::UseCaseError),
}

impl From<UseCaseError> for RenewalError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidName => Self::BadClientData(
                "The subscription name must be between 2 and 100 characters long.".into(),
            ),
            UseCaseError::InvalidPrice(price) => Self::BadClientData(format!(
                "The price: {}, must be a non negative number.",
                price
            )),
            UseCaseError::InvalidEmail(email) => {
                Self::BadClientData(format!("Invalid customer email: {}", email))
            }
            UseCaseError::InvalidRenewalDate => {
                Self::BadClientData("The renewal date must be after the start date.".into())
            }
            UseCaseError::InvalidReminderOffsets(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::ScheduleReminders(e) => e.into(),
        }
    }
}

pub(super) fn validate_name(name: &str) -> Result<String, UseCaseError> {
    let name = name.trim();
    let len = name.chars().count();
    if !(2..=100).contains(&len) {
        return Err(UseCaseError::InvalidName);
    }
    Ok(name.to_string())
}

pub(super) fn validate_price(price: f64) -> Result<f64, UseCaseError> {
    if !price.is_finite() || price < 0.0 {
        return Err(UseCaseError::InvalidPrice(price));
    }
    Ok(price)
}

pub(super) fn validate_email(email: &str) -> Result<String, UseCaseError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(UseCaseError::InvalidEmail(email.to_string())),
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateSubscription";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        let name = validate_name(&self.name)?;
        let price = validate_price(self.price)?;
        let customer_email = validate_email(&self.customer_email)?;
        let reminder_offsets = normalize_reminder_offsets(
            self.reminder_offsets
                .clone()
                .unwrap_or_else(|| DEFAULT_REMINDER_OFFSETS.to_vec()),
        )
        .map_err(UseCaseError::InvalidReminderOffsets)?;

        let renewal_date = match self.renewal_date {
            Some(renewal_date) => renewal_date,
            None => derive_renewal_date(self.start_date, self.frequency)
                .map_err(|_| UseCaseError::InvalidRenewalDate)?,
        };
        if renewal_date <= self.start_date {
            return Err(UseCaseError::InvalidRenewalDate);
        }

        let now = ctx.sys.get_timestamp_millis();
        let status = if is_expired(renewal_date, now) {
            SubscriptionStatus::Expired
        } else {
            SubscriptionStatus::Active
        };

        let mut subscription = Subscription {
            id: ID::new(),
            user_id: self.user_id.clone(),
            name,
            price,
            currency: self.currency,
            frequency: self.frequency,
            category: self.category,
            status,
            customer_email,
            start_date: self.start_date,
            renewal_date,
            reminder_offsets,
            reminders: Vec::new(),
            created: now,
            updated: now,
        };

        ctx.repos
            .subscriptions
            .insert(&subscription)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let reschedule = RescheduleRemindersUseCase {
            subscription_id: subscription.id.clone(),
        };
        if let Some(reminders) = execute(reschedule, ctx)
            .await
            .map_err(UseCaseError::ScheduleReminders)?
        {
            subscription.replace_reminders(reminders);
        }

        Ok(subscription)
    }
}
