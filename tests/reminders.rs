mod helpers;

use helpers::setup::{spawn_app_with_context, TestApp};
use renewal_reminders_api::run_due_jobs;
use renewal_reminders_api_structs::dtos::SubscriptionDTO;
use renewal_reminders_api_structs::*;
use renewal_reminders_domain::{
    Category, Frequency, ReminderStatus, SubscriptionStatus, DAY_MILLIS, ID,
};
use renewal_reminders_infra::{InMemoryNotifier, MockSys, RenewalContext};
use std::sync::Arc;

// Mon Mar 01 2021 12:00:00 UTC
const NOW: i64 = 1614600000000;

struct Harness {
    app: TestApp,
    ctx: RenewalContext,
    sys: Arc<MockSys>,
    notifier: Arc<InMemoryNotifier>,
}

/// The worker is driven by the tests through `run_due_jobs` on a mocked clock
async fn setup() -> Harness {
    let mut ctx = RenewalContext::create_inmemory();
    let sys = Arc::new(MockSys::new(NOW));
    let notifier = Arc::new(InMemoryNotifier::new());
    ctx.sys = sys.clone();
    ctx.notifier = notifier.clone();
    ctx.config.worker_enabled = false;

    let app = spawn_app_with_context(ctx.clone()).await;
    Harness {
        app,
        ctx,
        sys,
        notifier,
    }
}

async fn create(h: &Harness, renewal_in_days: i64, offsets: Vec<i64>) -> SubscriptionDTO {
    let body = create_subscription::RequestBody {
        user_id: ID::new(),
        name: "Spotify".into(),
        price: 9.99,
        currency: None,
        frequency: Frequency::Monthly,
        category: Category::Entertainment,
        customer_email: "customer@example.com".into(),
        start_date: NOW - 20 * DAY_MILLIS,
        renewal_date: Some(NOW + renewal_in_days * DAY_MILLIS),
        reminder_offsets: Some(offsets),
    };
    h.app
        .client
        .post(h.app.url("/subscriptions"))
        .json(&body)
        .send()
        .await
        .expect("To send request")
        .json::<create_subscription::APIResponse>()
        .await
        .expect("To parse response")
        .subscription
}

async fn get(h: &Harness, subscription_id: &ID) -> SubscriptionDTO {
    h.app
        .client
        .get(h.app.url(&format!("/subscriptions/{}", subscription_id)))
        .send()
        .await
        .expect("To send request")
        .json::<get_subscription::APIResponse>()
        .await
        .expect("To parse response")
        .subscription
}

async fn update(h: &Harness, subscription_id: &ID, body: update_subscription::RequestBody) {
    let res = h
        .app
        .client
        .put(h.app.url(&format!("/subscriptions/{}", subscription_id)))
        .json(&body)
        .send()
        .await
        .expect("To send request");
    assert!(res.status().is_success());
}

fn status_of(subscription: &SubscriptionDTO, offset_days: i64) -> ReminderStatus {
    subscription
        .reminders
        .iter()
        .find(|r| r.offset_days == offset_days)
        .map(|r| r.status)
        .expect("To find reminder")
}

#[actix_web::test]
async fn test_reminders_are_sent_when_they_are_due() {
    let h = setup().await;
    let subscription = create(&h, 10, vec![30, 7, 1]).await;

    let queued = subscription
        .reminders
        .iter()
        .map(|r| (r.offset_days, r.scheduled_for))
        .collect::<Vec<_>>();
    assert_eq!(
        queued,
        vec![
            (30, NOW - 20 * DAY_MILLIS),
            (7, NOW + 3 * DAY_MILLIS),
            (1, NOW + 9 * DAY_MILLIS),
        ]
    );

    // Overdue reminders go out right away
    assert_eq!(run_due_jobs(&h.ctx).await.sent, 1);
    let stored = get(&h, &subscription.id).await;
    assert_eq!(status_of(&stored, 30), ReminderStatus::Sent);
    assert_eq!(status_of(&stored, 7), ReminderStatus::Scheduled);

    h.sys.advance(3 * DAY_MILLIS);
    assert_eq!(run_due_jobs(&h.ctx).await.sent, 1);

    h.sys.advance(6 * DAY_MILLIS);
    assert_eq!(run_due_jobs(&h.ctx).await.sent, 1);

    let stored = get(&h, &subscription.id).await;
    assert!(stored
        .reminders
        .iter()
        .all(|r| r.status == ReminderStatus::Sent && r.sent_at.is_some()));

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent
        .iter()
        .all(|m| m.subject == "Reminder: subscription renews on Thu Mar 11 2021"));
    assert!(sent[2].body.contains("1 day(s) before renewal"));
}

#[actix_web::test]
async fn test_only_the_last_offset_fires_after_nine_days() {
    let h = setup().await;
    let subscription = create(&h, 10, vec![7, 1]).await;

    let body = update_subscription::RequestBody {
        reminder_offsets: Some(vec![1]),
        ..Default::default()
    };
    update(&h, &subscription.id, body).await;

    h.sys.advance(9 * DAY_MILLIS);
    let summary = run_due_jobs(&h.ctx).await;
    assert_eq!(summary.sent, 1);
    assert_eq!(h.notifier.sent().len(), 1);
    assert!(h.notifier.sent()[0].body.contains("1 day(s) before renewal"));

    let stored = get(&h, &subscription.id).await;
    assert_eq!(stored.reminders.len(), 1);
    assert_eq!(status_of(&stored, 1), ReminderStatus::Sent);
}

#[actix_web::test]
async fn test_cancelled_subscriptions_get_no_reminders() {
    let h = setup().await;
    let subscription = create(&h, 10, vec![7]).await;

    let body = update_subscription::RequestBody {
        status: Some(SubscriptionStatus::Cancelled),
        ..Default::default()
    };
    update(&h, &subscription.id, body).await;

    h.sys.advance(3 * DAY_MILLIS);
    let summary = run_due_jobs(&h.ctx).await;
    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.discarded, 1);
    assert!(h.notifier.sent().is_empty());
}

#[actix_web::test]
async fn test_moving_the_renewal_date_replaces_the_reminders() {
    let h = setup().await;
    let subscription = create(&h, 10, vec![7]).await;

    let body = update_subscription::RequestBody {
        renewal_date: Some(NOW + 20 * DAY_MILLIS),
        ..Default::default()
    };
    update(&h, &subscription.id, body).await;

    // The reminder of the old renewal date would have been due by now
    h.sys.advance(3 * DAY_MILLIS);
    assert_eq!(run_due_jobs(&h.ctx).await.claimed, 0);

    h.sys.advance(10 * DAY_MILLIS);
    assert_eq!(run_due_jobs(&h.ctx).await.sent, 1);

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Reminder: subscription renews on Sun Mar 21 2021");
}

#[actix_web::test]
async fn test_stalled_job_of_the_old_renewal_date_is_not_delivered() {
    let h = setup().await;
    let subscription = create(&h, 10, vec![7]).await;

    // A worker picks up the reminder and stalls, so the job can not be withdrawn
    h.sys.advance(3 * DAY_MILLIS);
    let stalled = h.ctx.queue.claim_due(NOW + 3 * DAY_MILLIS, 1).await.unwrap();
    assert_eq!(stalled.len(), 1);

    let body = update_subscription::RequestBody {
        renewal_date: Some(NOW + 30 * DAY_MILLIS),
        ..Default::default()
    };
    update(&h, &subscription.id, body).await;

    // The lock expires and the old job is picked up again
    h.sys.advance(h.ctx.config.job_lock_timeout_millis);
    let summary = run_due_jobs(&h.ctx).await;
    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.discarded, 1);
    assert!(h.notifier.sent().is_empty());

    let stored = get(&h, &subscription.id).await;
    assert_eq!(stored.reminders.len(), 1);
    assert_ne!(stored.reminders[0].job_id, stalled[0].job_id);
    assert_eq!(stored.reminders[0].status, ReminderStatus::Scheduled);
    assert_eq!(stored.reminders[0].scheduled_for, NOW + 23 * DAY_MILLIS);
}

#[actix_web::test]
async fn test_failed_deliveries_are_retried() {
    let h = setup().await;
    let subscription = create(&h, 10, vec![7]).await;

    h.notifier.fail_next(1);
    h.sys.advance(3 * DAY_MILLIS);
    assert_eq!(run_due_jobs(&h.ctx).await.retrying, 1);
    assert_eq!(status_of(&get(&h, &subscription.id).await, 7), ReminderStatus::Scheduled);

    h.sys.advance(2000);
    assert_eq!(run_due_jobs(&h.ctx).await.sent, 1);
    assert_eq!(status_of(&get(&h, &subscription.id).await, 7), ReminderStatus::Sent);
    assert_eq!(h.notifier.sent().len(), 1);
}
