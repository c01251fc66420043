//! Batched email delivery.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use alerthub_database::ReceiptStore;
use alerthub_entity::alert::Alert;
use alerthub_entity::preference::NotificationPreference;
use alerthub_entity::receipt::DeliveryChannel;

use crate::provider::{EmailConnection, EmailMessage, EmailProvider, with_timeout};
use crate::tally::DeliveryTally;
use crate::template;

/// Sends email in batches, one provider connection per batch.
///
/// A failed recipient is logged and skipped; a batch is never aborted.
#[derive(Debug, Clone)]
pub struct EmailDispatcher {
    provider: Arc<dyn EmailProvider>,
    receipts: Arc<dyn ReceiptStore>,
    batch_size: usize,
    timeout: Duration,
}

impl EmailDispatcher {
    /// Create a dispatcher.
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        receipts: Arc<dyn ReceiptStore>,
        batch_size: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            receipts,
            batch_size: batch_size.max(1),
            timeout,
        }
    }

    /// Recipients per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Email `alert` to every recipient whose email flag is still unset.
    ///
    /// Each batch opens its connection first. A recipient's receipt is
    /// claimed right before its send on that open connection, so a
    /// recipient is mailed at most once per alert even when two runs
    /// overlap, and a batch whose connection fails claims nobody.
    pub async fn send_alert(
        &self,
        alert: &Alert,
        recipients: &[NotificationPreference],
    ) -> DeliveryTally {
        let mut tally = DeliveryTally::default();
        let sent_at = Utc::now();
        let subject = template::alert_subject(alert);
        let body = template::alert_email_body(alert, sent_at);

        for (index, batch) in recipients.chunks(self.batch_size).enumerate() {
            let batch_no = index + 1;
            let pending = self.unsent(alert, batch, &mut tally).await;
            if pending.is_empty() {
                continue;
            }

            let Some(mut connection) = self.open(batch_no).await else {
                for _ in &pending {
                    tally.record_failed();
                }
                continue;
            };

            let mut batch_tally = DeliveryTally::default();
            for pref in pending {
                match self
                    .receipts
                    .mark_channel_sent(alert.id, pref.user_id, DeliveryChannel::Email)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(alert_id = %alert.id, user_id = %pref.user_id, "Email already sent, skipping");
                        batch_tally.record_skipped();
                        continue;
                    }
                    Err(e) => {
                        error!(alert_id = %alert.id, user_id = %pref.user_id, error = %e, "Failed to claim email receipt");
                        batch_tally.record_failed();
                        continue;
                    }
                }

                let mut message = EmailMessage::text(&pref.email, &subject, &body);
                message.to_name = Some(pref.greeting_name().to_string());
                match with_timeout(self.timeout, connection.send(&message)).await {
                    Ok(()) => batch_tally.record_delivered(),
                    Err(e) => {
                        warn!(to = %message.to, error = %e, "Error sending email");
                        batch_tally.record_failed();
                    }
                }
            }

            info!(
                batch = batch_no,
                "Sent {} emails in batch {}",
                batch_tally.delivered,
                batch_no
            );
            tally += batch_tally;
        }

        tally
    }

    /// Recipients of `batch` whose email flag is not set yet. The claim
    /// itself still happens per recipient once a connection is open.
    async fn unsent<'a>(
        &self,
        alert: &Alert,
        batch: &'a [NotificationPreference],
        tally: &mut DeliveryTally,
    ) -> Vec<&'a NotificationPreference> {
        let mut pending = Vec::with_capacity(batch.len());
        for pref in batch {
            match self.receipts.get(alert.id, pref.user_id).await {
                Ok(Some(receipt)) if receipt.is_sent_via(DeliveryChannel::Email) => {
                    debug!(alert_id = %alert.id, user_id = %pref.user_id, "Email already sent, skipping");
                    tally.record_skipped();
                }
                Ok(_) => pending.push(pref),
                Err(e) => {
                    error!(alert_id = %alert.id, user_id = %pref.user_id, error = %e, "Failed to read email receipt");
                    tally.record_failed();
                }
            }
        }
        pending
    }

    async fn open(&self, batch_no: usize) -> Option<Box<dyn EmailConnection>> {
        match with_timeout(self.timeout, self.provider.connect()).await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!(
                    provider = self.provider.name(),
                    batch = batch_no,
                    error = %e,
                    "Failed to open email connection, batch skipped"
                );
                None
            }
        }
    }

    /// Send prepared messages in batches without touching receipts.
    pub async fn send_batched(&self, messages: &[EmailMessage]) -> DeliveryTally {
        let mut tally = DeliveryTally::default();
        for (index, batch) in messages.chunks(self.batch_size).enumerate() {
            tally += self.deliver_batch(index + 1, batch).await;
        }
        info!(
            delivered = tally.delivered,
            total = messages.len(),
            "Successfully sent {}/{} emails",
            tally.delivered,
            messages.len()
        );
        tally
    }

    async fn deliver_batch(&self, batch_no: usize, messages: &[EmailMessage]) -> DeliveryTally {
        let mut tally = DeliveryTally::default();
        if messages.is_empty() {
            return tally;
        }

        let Some(mut connection) = self.open(batch_no).await else {
            for _ in messages {
                tally.record_failed();
            }
            return tally;
        };

        for message in messages {
            match with_timeout(self.timeout, connection.send(message)).await {
                Ok(()) => tally.record_delivered(),
                Err(e) => {
                    warn!(to = %message.to, error = %e, "Error sending email");
                    tally.record_failed();
                }
            }
        }

        info!(
            batch = batch_no,
            "Sent {}/{} emails in batch {}",
            tally.delivered,
            messages.len(),
            batch_no
        );
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingEmailProvider;
    use alerthub_database::MemoryStore;
    use alerthub_entity::alert::CreateAlert;
    use uuid::Uuid;

    fn users(n: usize) -> Vec<NotificationPreference> {
        (0..n)
            .map(|i| {
                NotificationPreference::new(Uuid::new_v4(), format!("U{i}"), format!("u{i}@example.com"))
            })
            .collect()
    }

    fn dispatcher(provider: Arc<RecordingEmailProvider>, store: Arc<MemoryStore>) -> EmailDispatcher {
        EmailDispatcher::new(provider, store, 2, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_one_connection_per_batch() {
        let provider = Arc::new(RecordingEmailProvider::default());
        let store = Arc::new(MemoryStore::new());
        let alert = CreateAlert::new("Fire", "Evacuate").into_alert().unwrap();

        let tally = dispatcher(provider.clone(), store)
            .send_alert(&alert, &users(5))
            .await;

        assert_eq!(tally.delivered, 5);
        assert_eq!(provider.connections(), 3);
        assert_eq!(provider.sent().len(), 5);
        assert_eq!(provider.sent()[0].subject, "ALERT: Fire");
    }

    #[tokio::test]
    async fn test_second_run_skips_everyone() {
        let provider = Arc::new(RecordingEmailProvider::default());
        let store = Arc::new(MemoryStore::new());
        let alert = CreateAlert::new("Fire", "Evacuate").into_alert().unwrap();
        let recipients = users(3);
        let dispatcher = dispatcher(provider.clone(), store);

        dispatcher.send_alert(&alert, &recipients).await;
        let second = dispatcher.send_alert(&alert, &recipients).await;

        assert_eq!(second.skipped, 3);
        assert_eq!(second.delivered, 0);
        assert_eq!(provider.sent().len(), 3);
        assert_eq!(provider.connections(), 2);
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_abort_batch() {
        let provider = Arc::new(RecordingEmailProvider::failing_for("u1@example.com"));
        let store = Arc::new(MemoryStore::new());
        let alert = CreateAlert::new("Fire", "Evacuate").into_alert().unwrap();

        let tally = dispatcher(provider.clone(), store)
            .send_alert(&alert, &users(3))
            .await;

        assert_eq!(tally.attempted, 3);
        assert_eq!(tally.delivered, 2);
        assert_eq!(tally.failed, 1);
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_receipts_unclaimed() {
        let store = Arc::new(MemoryStore::new());
        let alert = CreateAlert::new("Fire", "Evacuate").into_alert().unwrap();
        let recipients = users(3);

        let down = Arc::new(RecordingEmailProvider::unreachable());
        let tally = dispatcher(down, store.clone())
            .send_alert(&alert, &recipients)
            .await;
        assert_eq!(tally.failed, 3);
        assert_eq!(tally.delivered, 0);
        for pref in &recipients {
            let receipt = store.get(alert.id, pref.user_id).await.unwrap();
            assert!(!receipt.is_some_and(|r| r.is_sent_via(DeliveryChannel::Email)));
        }

        let provider = Arc::new(RecordingEmailProvider::default());
        let retry = dispatcher(provider.clone(), store)
            .send_alert(&alert, &recipients)
            .await;
        assert_eq!(retry.delivered, 3);
        assert_eq!(provider.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_send_batched_counts_accepted_messages() {
        let provider = Arc::new(RecordingEmailProvider::default());
        let store = Arc::new(MemoryStore::new());
        let messages: Vec<EmailMessage> = (0..3)
            .map(|i| EmailMessage::text(format!("r{i}@example.com"), "Report", "Attached"))
            .collect();

        let tally = dispatcher(provider.clone(), store.clone())
            .send_batched(&messages)
            .await;

        assert_eq!(tally.delivered, 3);
        assert_eq!(provider.connections(), 2);
        assert_eq!(store.receipt_count().await, 0);
    }
}
