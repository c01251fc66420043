//! Alert dispatch service: validation, fan-out and read tracking.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use alerthub_core::error::AppError;
use alerthub_core::events::{AlertEvent, DomainEvent, EventPayload, EventPublisher};
use alerthub_core::result::AppResult;
use alerthub_core::traits::TaskQueue;
use alerthub_database::{AlertStore, ReceiptStore};
use alerthub_entity::alert::{Alert, CreateAlert};
use alerthub_entity::job::JobPayload;

use crate::eligibility::EligibilityResolver;
use crate::email::EmailDispatcher;
use crate::push::PushDispatcher;
use crate::sms::SmsDispatcher;
use crate::tally::DeliveryTally;

/// Returned by [`AlertDispatchService::dispatch`] before any delivery
/// has happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchAck {
    /// The alert being delivered.
    pub alert_id: Uuid,
    /// Background job performing the fan-out.
    pub job_id: Uuid,
    /// Users eligible for email.
    pub email_candidates: u64,
    /// Users eligible for SMS.
    pub sms_candidates: u64,
    /// Distinct eligible users.
    pub total_candidates: u64,
}

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// The alert delivered.
    pub alert_id: Uuid,
    /// Emails accepted by the provider in this pass.
    pub email_sent: u64,
    /// SMS jobs queued in this pass.
    pub sms_sent: u64,
    /// Push notifications sent (always zero).
    pub push_sent: u64,
    /// Distinct eligible users.
    pub total_candidates: u64,
    /// Email counters.
    pub email: DeliveryTally,
    /// SMS counters.
    pub sms: DeliveryTally,
}

/// Entry point for alert delivery.
#[derive(Debug, Clone)]
pub struct AlertDispatchService {
    alerts: Arc<dyn AlertStore>,
    receipts: Arc<dyn ReceiptStore>,
    resolver: EligibilityResolver,
    email: EmailDispatcher,
    sms: SmsDispatcher,
    push: PushDispatcher,
    queue: Arc<dyn TaskQueue>,
    events: EventPublisher,
}

impl AlertDispatchService {
    /// Create the service.
    pub fn new(
        alerts: Arc<dyn AlertStore>,
        receipts: Arc<dyn ReceiptStore>,
        resolver: EligibilityResolver,
        email: EmailDispatcher,
        sms: SmsDispatcher,
        queue: Arc<dyn TaskQueue>,
        events: EventPublisher,
    ) -> Self {
        Self {
            alerts,
            receipts,
            resolver,
            email,
            sms,
            push: PushDispatcher,
            queue,
            events,
        }
    }

    /// Persist a new alert.
    pub async fn create_alert(&self, input: CreateAlert) -> AppResult<Alert> {
        let alert = input.into_alert()?;
        let alert = self.alerts.create(&alert).await?;
        info!(alert_id = %alert.id, title = %alert.title, approved = alert.is_approved, "Alert created");
        Ok(alert)
    }

    /// Approve a pending alert.
    pub async fn approve(&self, alert_id: Uuid) -> AppResult<()> {
        if !self.alerts.approve(alert_id).await? {
            return Err(AppError::not_found(format!("Alert {alert_id} not found")));
        }
        info!(alert_id = %alert_id, "Alert approved");
        Ok(())
    }

    /// Validate the alert and queue its fan-out.
    ///
    /// Returns as soon as the job is queued. Unknown, unapproved and
    /// expired alerts are rejected without queueing anything.
    pub async fn dispatch(&self, alert_id: Uuid) -> AppResult<DispatchAck> {
        let alert = self.load(alert_id).await?;
        alert.ensure_dispatchable(Utc::now())?;

        let candidates = self.resolver.resolve(&alert).await?;
        let payload = JobPayload::AlertFanout { alert_id };
        let job_id = self
            .queue
            .enqueue(payload.job_type(), payload.to_value()?)
            .await?;

        let ack = DispatchAck {
            alert_id,
            job_id,
            email_candidates: candidates.email.len() as u64,
            sms_candidates: candidates.sms.len() as u64,
            total_candidates: candidates.total() as u64,
        };
        info!(
            alert_id = %alert_id,
            job_id = %job_id,
            total_candidates = ack.total_candidates,
            "Alert fan-out queued"
        );
        Ok(ack)
    }

    /// Deliver the alert on every enabled channel and mark it sent.
    ///
    /// Runs on the worker. Per-recipient failures only show up in the
    /// tallies and logs.
    pub async fn run_fanout(&self, alert_id: Uuid) -> AppResult<DispatchSummary> {
        let alert = self.load(alert_id).await?;
        alert.ensure_dispatchable(Utc::now())?;

        let candidates = self.resolver.resolve(&alert).await?;
        let email = self.email.send_alert(&alert, &candidates.email).await;
        let sms = self.sms.queue_alert(&alert, &candidates.sms).await;
        let push = self.push.send_alert(&alert, &candidates.push).await;

        if !self.alerts.mark_sent(alert_id, Utc::now()).await? {
            warn!(alert_id = %alert_id, "Alert disappeared before it could be marked sent");
        }

        let summary = DispatchSummary {
            alert_id,
            email_sent: email.delivered,
            sms_sent: sms.delivered,
            push_sent: push.delivered,
            total_candidates: candidates.total() as u64,
            email,
            sms,
        };

        self.events.publish(DomainEvent::new(
            None,
            EventPayload::Alert(AlertEvent::Dispatched {
                alert_id,
                email_sent: summary.email_sent,
                sms_sent: summary.sms_sent,
                total_candidates: summary.total_candidates,
            }),
        ));

        info!(
            alert_id = %alert_id,
            email_sent = summary.email_sent,
            email_failed = summary.email.failed,
            sms_sent = summary.sms_sent,
            total_candidates = summary.total_candidates,
            "Alert sent to {} users",
            summary.total_candidates
        );
        Ok(summary)
    }

    /// Approved, unexpired alerts the user has not opened.
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        self.receipts.unread_count(user_id).await
    }

    /// Record that `user_id` opened the alert. Returns `true` on the
    /// first view only.
    pub async fn mark_viewed(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.load(alert_id).await?;
        let first = self.receipts.mark_viewed(alert_id, user_id).await?;
        if first {
            self.events.publish(DomainEvent::new(
                Some(user_id),
                EventPayload::Alert(AlertEvent::Viewed { alert_id, user_id }),
            ));
        }
        Ok(first)
    }

    async fn load(&self, alert_id: Uuid) -> AppResult<Alert> {
        self.alerts
            .find_by_id(alert_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Alert {alert_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use alerthub_core::error::ErrorKind;
    use alerthub_database::{MemoryStore, PreferenceStore};
    use alerthub_entity::job::payload::ALERT_FANOUT;
    use alerthub_entity::preference::NotificationPreference;

    use crate::test_support::{RecordingEmailProvider, RecordingQueue, RecordingSmsProvider};

    struct Harness {
        service: AlertDispatchService,
        store: Arc<MemoryStore>,
        queue: Arc<RecordingQueue>,
        email: Arc<RecordingEmailProvider>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(RecordingQueue::default());
        let email = Arc::new(RecordingEmailProvider::default());
        let (events, _rx) = EventPublisher::channel(16);
        let timeout = Duration::from_secs(1);

        let service = AlertDispatchService::new(
            store.clone(),
            store.clone(),
            EligibilityResolver::new(store.clone()),
            EmailDispatcher::new(email.clone(), store.clone(), 50, timeout),
            SmsDispatcher::new(
                Arc::new(RecordingSmsProvider::default()),
                store.clone(),
                queue.clone(),
                100,
                timeout,
            ),
            queue.clone(),
            events,
        );
        Harness {
            service,
            store,
            queue,
            email,
        }
    }

    #[tokio::test]
    async fn test_dispatch_queues_fanout_and_returns_counts() {
        let h = harness();
        h.store
            .upsert(&NotificationPreference::new(Uuid::new_v4(), "A", "a@example.com"))
            .await
            .unwrap();
        let alert = h
            .service
            .create_alert(CreateAlert::new("Fire", "Evacuate"))
            .await
            .unwrap();

        let ack = h.service.dispatch(alert.id).await.unwrap();

        assert_eq!(ack.email_candidates, 1);
        assert_eq!(ack.total_candidates, 1);
        assert!(h.email.sent().is_empty());
        let jobs = h.queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].0, ALERT_FANOUT);
    }

    #[tokio::test]
    async fn test_unapproved_alert_rejected_before_queueing() {
        let h = harness();
        let mut input = CreateAlert::new("Fire", "Evacuate");
        input.is_approved = false;
        let alert = h.service.create_alert(input).await.unwrap();

        let err = h.service.dispatch(alert.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(h.queue.jobs().is_empty());

        h.service.approve(alert.id).await.unwrap();
        assert!(h.service.dispatch(alert.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_alert_is_not_found() {
        let h = harness();
        let err = h.service.dispatch(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_zero_candidates_still_marks_sent() {
        let h = harness();
        let alert = h
            .service
            .create_alert(CreateAlert::new("Fire", "Evacuate"))
            .await
            .unwrap();

        let summary = h.service.run_fanout(alert.id).await.unwrap();
        assert_eq!(summary.total_candidates, 0);
        assert_eq!(summary.email_sent, 0);

        let stored = AlertStore::find_by_id(h.store.as_ref(), alert.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_sent);
        assert!(stored.sent_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_viewed_first_time_only() {
        let h = harness();
        let user = Uuid::new_v4();
        let alert = h
            .service
            .create_alert(CreateAlert::new("Fire", "Evacuate"))
            .await
            .unwrap();

        assert_eq!(h.service.unread_count(user).await.unwrap(), 1);
        assert!(h.service.mark_viewed(alert.id, user).await.unwrap());
        assert!(!h.service.mark_viewed(alert.id, user).await.unwrap());
        assert_eq!(h.service.unread_count(user).await.unwrap(), 0);
    }
}
