use crate::error::RenewalError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::get_subscription::{APIResponse, PathParams};
use renewal_reminders_domain::{Subscription, ID};
use renewal_reminders_infra::RenewalContext;

pub async fn get_subscription_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<RenewalContext>,
) -> Result<HttpResponse, RenewalError> {
    let usecase = GetSubscriptionUseCase {
        subscription_id: path.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(RenewalError::from)
}

#[derive(Debug)]
struct GetSubscriptionUseCase {
    pub subscription_id: ID,
}

#[derive(Debug)]
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
impl UseCase for GetSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSubscription";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.subscription_id.clone()))
    }
}
