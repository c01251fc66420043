//! Alert lifecycle events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events raised while an alert moves through dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertEvent {
    /// The fan-out pass for an alert finished.
    Dispatched {
        /// Alert ID.
        alert_id: Uuid,
        /// Emails accepted by the provider.
        email_sent: u64,
        /// SMS deliveries queued.
        sms_sent: u64,
        /// Distinct candidate recipients.
        total_candidates: u64,
    },
    /// A user opened an alert for the first time.
    Viewed {
        /// Alert ID.
        alert_id: Uuid,
        /// Viewer.
        user_id: Uuid,
    },
}
