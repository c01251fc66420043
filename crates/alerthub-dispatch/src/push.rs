//! Push notifications.

use tracing::debug;

use alerthub_entity::alert::Alert;
use alerthub_entity::preference::NotificationPreference;

use crate::tally::DeliveryTally;

/// Placeholder for push delivery. Accepts alerts and delivers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushDispatcher;

impl PushDispatcher {
    /// No-op; returns an empty tally.
    pub async fn send_alert(
        &self,
        alert: &Alert,
        recipients: &[NotificationPreference],
    ) -> DeliveryTally {
        debug!(
            alert_id = %alert.id,
            recipients = recipients.len(),
            "Push delivery is not implemented"
        );
        DeliveryTally::default()
    }
}
