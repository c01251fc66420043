//! Crime report events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events raised by the crime report write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrimeEvent {
    /// A crime report was filed.
    Reported {
        /// Report ID.
        report_id: Uuid,
        /// Report title.
        title: String,
        /// Free-text location.
        location: String,
        /// When the crime was reported.
        occurred_at: DateTime<Utc>,
    },
}

impl CrimeEvent {
    /// The one-line announcement pushed to dashboards and phones.
    pub fn message(&self) -> String {
        match self {
            Self::Reported {
                title,
                location,
                occurred_at,
                ..
            } => format!(
                "New Crime Alert: {} at {} on {}",
                title,
                location,
                occurred_at.format("%Y-%m-%d %H:%M")
            ),
        }
    }
}
