use crate::error::RenewalError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::get_user_subscriptions::{APIResponse, PathParams};
use renewal_reminders_domain::{Subscription, ID};
use renewal_reminders_infra::RenewalContext;

pub async fn get_user_subscriptions_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<RenewalContext>,
) -> Result<HttpResponse, RenewalError> {
    let usecase = GetUserSubscriptionsUseCase {
        user_id: path.user_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscriptions| HttpResponse::Ok().json(APIResponse::new(subscriptions)))
        .map_err(|_: ()| RenewalError::InternalError)
}

#[derive(Debug)]
struct GetUserSubscriptionsUseCase {
    pub user_id: ID,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUserSubscriptionsUseCase {
    type Response = Vec<Subscription>;

    type Error = ();

    const NAME: &'static str = "GetUserSubscriptions";

    async fn execute(&mut self, ctx: &RenewalContext) -> Result<Self::Response, Self::Error> {
        let mut subscriptions = ctx.repos.subscriptions.find_by_user(&self.user_id).await;
        subscriptions.sort_by_key(|s| s.created);
        Ok(subscriptions)
    }
}
