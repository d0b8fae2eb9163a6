mod create_subscription;
mod delete_subscription;
pub mod deliver_reminder;
mod get_subscription;
mod get_user_subscriptions;
pub mod reschedule_reminders;
mod update_subscription;

use actix_web::web;
use create_subscription::create_subscription_controller;
use delete_subscription::delete_subscription_controller;
use get_subscription::get_subscription_controller;
use get_user_subscriptions::get_user_subscriptions_controller;
use reschedule_reminders::reschedule_reminders_controller;
use update_subscription::update_subscription_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/subscriptions",
        web::post().to(create_subscription_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}",
        web::get().to(get_subscription_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}",
        web::put().to(update_subscription_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}",
        web::delete().to(delete_subscription_controller),
    );
    cfg.route(
        "/user/{user_id}/subscriptions",
        web::get().to(get_user_subscriptions_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}/reminders/reschedule",
        web::post().to(reschedule_reminders_controller),
    );
}
