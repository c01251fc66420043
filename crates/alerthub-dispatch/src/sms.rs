//! SMS delivery through background jobs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use alerthub_core::traits::TaskQueue;
use alerthub_database::ReceiptStore;
use alerthub_entity::alert::Alert;
use alerthub_entity::job::JobPayload;
use alerthub_entity::preference::NotificationPreference;
use alerthub_entity::receipt::DeliveryChannel;

use crate::provider::{ProviderError, SmsProvider, with_timeout};
use crate::tally::DeliveryTally;
use crate::template;

/// Queues one fire-and-forget job per SMS recipient and performs the
/// provider call when the job runs.
#[derive(Debug, Clone)]
pub struct SmsDispatcher {
    provider: Arc<dyn SmsProvider>,
    receipts: Arc<dyn ReceiptStore>,
    queue: Arc<dyn TaskQueue>,
    preview_chars: usize,
    timeout: Duration,
}

impl SmsDispatcher {
    /// Create a dispatcher.
    pub fn new(
        provider: Arc<dyn SmsProvider>,
        receipts: Arc<dyn ReceiptStore>,
        queue: Arc<dyn TaskQueue>,
        preview_chars: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            receipts,
            queue,
            preview_chars,
            timeout,
        }
    }

    /// Queue the alert text for every recipient whose SMS flag is still
    /// unset. `delivered` counts jobs handed to the queue.
    ///
    /// Jobs go in as follow-ups, which a bounded queue never rejects for
    /// capacity, so a claimed recipient always gets its job.
    pub async fn queue_alert(
        &self,
        alert: &Alert,
        recipients: &[NotificationPreference],
    ) -> DeliveryTally {
        let mut tally = DeliveryTally::default();
        let body = template::alert_sms_body(alert, self.preview_chars);

        for pref in recipients {
            let Some(phone) = pref.phone() else {
                tally.record_skipped();
                continue;
            };

            match self
                .receipts
                .mark_channel_sent(alert.id, pref.user_id, DeliveryChannel::Sms)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    debug!(alert_id = %alert.id, user_id = %pref.user_id, "SMS already queued, skipping");
                    tally.record_skipped();
                    continue;
                }
                Err(e) => {
                    error!(alert_id = %alert.id, user_id = %pref.user_id, error = %e, "Failed to claim SMS receipt");
                    tally.record_failed();
                    continue;
                }
            }

            let payload = JobPayload::SmsDelivery {
                to: phone.to_string(),
                body: body.clone(),
                alert_id: Some(alert.id),
                user_id: Some(pref.user_id),
            };
            if self.enqueue(&payload).await {
                tally.record_delivered();
            } else {
                tally.record_failed();
            }
        }

        tally
    }

    /// Queue `body` for every recipient with a phone number. No receipts
    /// are involved.
    pub async fn queue_broadcast(
        &self,
        recipients: &[NotificationPreference],
        body: &str,
    ) -> DeliveryTally {
        let mut tally = DeliveryTally::default();
        for pref in recipients {
            let Some(phone) = pref.phone() else {
                tally.record_skipped();
                continue;
            };
            let payload = JobPayload::SmsDelivery {
                to: phone.to_string(),
                body: body.to_string(),
                alert_id: None,
                user_id: Some(pref.user_id),
            };
            if self.enqueue(&payload).await {
                tally.record_delivered();
            } else {
                tally.record_failed();
            }
        }
        info!(queued = tally.delivered, total = recipients.len(), "Queued SMS broadcast");
        tally
    }

    /// Send one message now. Called by the SMS job; a failure is final.
    pub async fn deliver(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        with_timeout(self.timeout, self.provider.send(to, body)).await?;
        info!(to = %to, provider = self.provider.name(), "SMS sent");
        Ok(())
    }

    async fn enqueue(&self, payload: &JobPayload) -> bool {
        let value = match payload.to_value() {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Failed to encode SMS job");
                return false;
            }
        };
        match self.queue.enqueue_follow_up(payload.job_type(), value).await {
            Ok(job_id) => {
                debug!(job_id = %job_id, "SMS job queued");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to queue SMS job");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingQueue, RecordingSmsProvider};
    use alerthub_database::MemoryStore;
    use alerthub_entity::alert::CreateAlert;
    use alerthub_entity::job::payload::SMS_DELIVERY;
    use uuid::Uuid;

    fn dispatcher(queue: Arc<RecordingQueue>, sms: Arc<RecordingSmsProvider>) -> SmsDispatcher {
        SmsDispatcher::new(
            sms,
            Arc::new(MemoryStore::new()),
            queue,
            100,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_queue_alert_once_per_recipient() {
        let queue = Arc::new(RecordingQueue::default());
        let sms = Arc::new(RecordingSmsProvider::default());
        let dispatcher = dispatcher(queue.clone(), sms.clone());
        let alert = CreateAlert::new("Flood", "Move to higher ground")
            .into_alert()
            .unwrap();
        let recipients =
            vec![NotificationPreference::new(Uuid::new_v4(), "A", "a@example.com").with_phone("+15550001")];

        let first = dispatcher.queue_alert(&alert, &recipients).await;
        let second = dispatcher.queue_alert(&alert, &recipients).await;

        assert_eq!(first.delivered, 1);
        assert_eq!(second.skipped, 1);
        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].0, SMS_DELIVERY);
        assert_eq!(jobs[0].1["body"], "ALERT: Flood - Move to higher ground");
        assert!(sms.sent().is_empty());
    }

    #[tokio::test]
    async fn test_blank_phone_is_skipped() {
        let queue = Arc::new(RecordingQueue::default());
        let dispatcher = dispatcher(queue.clone(), Arc::new(RecordingSmsProvider::default()));
        let recipients =
            vec![NotificationPreference::new(Uuid::new_v4(), "A", "a@example.com").with_phone("  ")];

        let tally = dispatcher.queue_broadcast(&recipients, "hello").await;
        assert_eq!(tally.skipped, 1);
        assert!(queue.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_calls_provider() {
        let sms = Arc::new(RecordingSmsProvider::default());
        let dispatcher = dispatcher(Arc::new(RecordingQueue::default()), sms.clone());
        dispatcher.deliver("+15550001", "hi").await.unwrap();
        assert_eq!(sms.sent(), vec![("+15550001".to_string(), "hi".to_string())]);
    }
}
