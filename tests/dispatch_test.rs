//! End-to-end alert fan-out over the in-memory backend.

mod helpers;

use chrono::{Duration, Utc};
use uuid::Uuid;

use alerthub_core::error::ErrorKind;
use alerthub_database::AlertStore;
use alerthub_entity::alert::CreateAlert;

use helpers::TestApp;

#[tokio::test]
async fn test_email_reaches_opted_in_users_once() {
    let t = TestApp::new().await;
    let a = t.user("Ada", "ada@example.com").await;
    let mut b = t.user("Ben", "ben@example.com").await;
    b.email_notifications = false;
    t.save(b).await;

    let alert = t.alert("Gas leak").await;
    let summary = t.dispatch_and_wait(alert.id).await;

    assert_eq!(summary.email_sent, 1);
    assert_eq!(t.email.sent_to("ada@example.com"), 1);
    assert_eq!(t.email.sent_to("ben@example.com"), 0);
    assert_eq!(t.email.sent()[0].subject, "ALERT: Gas leak");

    // A second dispatch finds every receipt claimed.
    let calls = t.email.sent().len();
    let again = t.dispatch_and_wait(alert.id).await;
    assert_eq!(again.email_sent, 0);
    assert_eq!(again.email.skipped, 1);
    assert_eq!(t.email.sent().len(), calls);

    let stored = t.app.stores.alerts.find_by_id(alert.id).await.unwrap().unwrap();
    assert!(stored.is_sent);

    assert_eq!(t.app.dispatch.unread_count(a.user_id).await.unwrap(), 1);
    assert!(t.app.dispatch.mark_viewed(alert.id, a.user_id).await.unwrap());
    assert_eq!(t.app.dispatch.unread_count(a.user_id).await.unwrap(), 0);

    t.shutdown().await;
}

#[tokio::test]
async fn test_sms_goes_through_the_queue() {
    let t = TestApp::new().await;
    t.save(
        alerthub_entity::preference::NotificationPreference::new(
            Uuid::new_v4(),
            "Cleo",
            "cleo@example.com",
        )
        .with_phone("+15550100"),
    )
    .await;
    t.user("Dan", "dan@example.com").await;

    let mut input = CreateAlert::new("Flood", "Move to higher ground");
    input.send_email = false;
    input.send_sms = true;
    let alert = t.app.dispatch.create_alert(input).await.unwrap();

    let summary = t.dispatch_and_wait(alert.id).await;

    assert_eq!(summary.sms_sent, 1);
    assert_eq!(summary.email_sent, 0);
    assert!(t.email.sent().is_empty());
    assert_eq!(
        t.sms.sent(),
        vec![(
            "+15550100".to_string(),
            "ALERT: Flood - Move to higher ground".to_string()
        )]
    );

    t.shutdown().await;
}

#[tokio::test]
async fn test_rejected_alerts_queue_nothing() {
    let t = TestApp::new().await;
    t.user("Ada", "ada@example.com").await;

    let mut pending = CreateAlert::new("Fire", "Evacuate");
    pending.is_approved = false;
    let pending = t.app.dispatch.create_alert(pending).await.unwrap();
    let err = t.app.dispatch.dispatch(pending.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let mut expired = CreateAlert::new("Storm", "Stay indoors");
    expired.expires_at = Some(Utc::now() - Duration::minutes(5));
    let expired = t.app.dispatch.create_alert(expired).await.unwrap();
    let err = t.app.dispatch.dispatch(expired.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = t.app.dispatch.dispatch(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let stats = t.app.queue.stats();
    assert_eq!(stats.pending + stats.running + stats.completed, 0);
    assert!(t.email.sent().is_empty());

    t.shutdown().await;
}

#[tokio::test]
async fn test_unread_ignores_expired_and_unapproved() {
    let t = TestApp::new().await;
    let user = Uuid::new_v4();

    t.alert("Active").await;
    let mut pending = CreateAlert::new("Pending", "Not yet approved");
    pending.is_approved = false;
    t.app.dispatch.create_alert(pending).await.unwrap();
    let mut expired = CreateAlert::new("Old", "Already over");
    expired.expires_at = Some(Utc::now() - Duration::hours(1));
    t.app.dispatch.create_alert(expired).await.unwrap();

    assert_eq!(t.app.dispatch.unread_count(user).await.unwrap(), 1);

    t.shutdown().await;
}

#[tokio::test]
async fn test_emails_are_batched_per_connection() {
    let t = TestApp::new().await;
    for i in 0..3 {
        t.user(&format!("User {i}"), &format!("user{i}@example.com")).await;
    }

    let alert = t.alert("Boil water").await;
    let summary = t.dispatch_and_wait(alert.id).await;

    assert_eq!(summary.email_sent, 3);
    // Default batch size covers all three recipients.
    assert_eq!(t.email.connections(), 1);

    t.shutdown().await;
}

#[tokio::test]
async fn test_sms_fanout_survives_full_queue() {
    use std::sync::Arc;

    use alerthub_database::{MemoryStore, ReceiptStore};
    use alerthub_dispatch::SmsDispatcher;
    use alerthub_entity::job::payload::SMS_DELIVERY;
    use alerthub_entity::preference::NotificationPreference;
    use alerthub_entity::receipt::DeliveryChannel;
    use alerthub_worker::JobQueue;
    use serde_json::json;

    let queue = Arc::new(JobQueue::new(1, 10));
    queue.enqueue_job("noop", json!({})).unwrap();
    let store = Arc::new(MemoryStore::new());
    let sms = Arc::new(helpers::RecordingSms::default());
    let dispatcher = SmsDispatcher::new(
        sms.clone(),
        store.clone(),
        queue.clone(),
        100,
        std::time::Duration::from_secs(1),
    );

    let mut create = CreateAlert::new("Flood", "Move to higher ground");
    create.send_sms = true;
    let alert = create.into_alert().unwrap();
    let recipients: Vec<NotificationPreference> = (0..3)
        .map(|i| {
            NotificationPreference::new(Uuid::new_v4(), format!("U{i}"), format!("u{i}@example.com"))
                .with_phone(format!("+1555000{i}"))
        })
        .collect();

    let first = dispatcher.queue_alert(&alert, &recipients).await;
    assert_eq!(first.delivered, 3);
    assert_eq!(first.failed, 0);
    assert_eq!(queue.stats().pending, 4);

    while queue.stats().pending > 0 {
        let job = queue.dequeue().await.unwrap();
        if job.job_type == SMS_DELIVERY {
            let to = job.payload["to"].as_str().unwrap();
            let body = job.payload["body"].as_str().unwrap();
            dispatcher.deliver(to, body).await.unwrap();
        }
        queue.complete(job.id, None);
    }
    assert_eq!(sms.sent().len(), 3);

    let second = dispatcher.queue_alert(&alert, &recipients).await;
    assert_eq!(second.skipped, 3);
    for pref in &recipients {
        let receipt = store.get(alert.id, pref.user_id).await.unwrap().unwrap();
        assert!(receipt.is_sent_via(DeliveryChannel::Sms));
    }
}
