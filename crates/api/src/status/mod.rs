use actix_web::{web, HttpResponse};
use renewal_reminders_api_structs::get_service_health::*;
use renewal_reminders_infra::RenewalContext;

async fn status(ctx: web::Data<RenewalContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        worker_concurrency: ctx.config.worker_concurrency,
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
