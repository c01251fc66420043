//! Alert entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;

use super::severity::Severity;

/// A broadcastable notification with targeting and channel flags.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    /// Unique alert identifier.
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Full alert text.
    pub content: String,
    /// Severity level.
    pub severity: Severity,
    /// Free-text location.
    pub location: Option<String>,
    /// Latitude of the incident.
    pub latitude: Option<f64>,
    /// Longitude of the incident.
    pub longitude: Option<f64>,
    /// Targeting radius in meters (0 = everyone). Recorded but not used
    /// to filter recipients.
    pub radius_meters: i32,
    /// Deliver by email.
    pub send_email: bool,
    /// Deliver by SMS.
    pub send_sms: bool,
    /// Deliver by push notification.
    pub send_push: bool,
    /// Whether a moderator approved the alert.
    pub is_approved: bool,
    /// After this instant the alert no longer counts as unread.
    pub expires_at: Option<DateTime<Utc>>,
    /// Set once the fan-out pass completed. Never reset.
    pub is_sent: bool,
    /// When the fan-out pass completed.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the alert was created.
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Whether the alert has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Approved and not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.is_approved && !self.is_expired(now)
    }

    /// Reject alerts that must not be fanned out.
    pub fn ensure_dispatchable(&self, now: DateTime<Utc>) -> AppResult<()> {
        if !self.is_approved {
            return Err(AppError::validation(format!(
                "Alert {} is not approved",
                self.id
            )));
        }
        if self.is_expired(now) {
            return Err(AppError::validation(format!("Alert {} has expired", self.id)));
        }
        Ok(())
    }
}

/// Data required to create a new alert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAlert {
    /// Short headline.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Full alert text.
    #[validate(length(min = 1))]
    pub content: String,
    /// Severity level.
    #[serde(default)]
    pub severity: Severity,
    /// Free-text location.
    #[validate(length(max = 255))]
    pub location: Option<String>,
    /// Latitude.
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    /// Longitude.
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    /// Targeting radius in meters.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub radius_meters: i32,
    /// Deliver by email.
    #[serde(default = "default_true")]
    pub send_email: bool,
    /// Deliver by SMS.
    #[serde(default)]
    pub send_sms: bool,
    /// Deliver by push notification.
    #[serde(default)]
    pub send_push: bool,
    /// Create the alert already approved.
    #[serde(default)]
    pub is_approved: bool,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateAlert {
    /// Minimal approved alert with the email channel on.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            severity: Severity::default(),
            location: None,
            latitude: None,
            longitude: None,
            radius_meters: 0,
            send_email: true,
            send_sms: false,
            send_push: false,
            is_approved: true,
            expires_at: None,
        }
    }

    /// Validate and materialize a new alert row.
    pub fn into_alert(self) -> AppResult<Alert> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid alert: {e}")))?;

        Ok(Alert {
            id: Uuid::new_v4(),
            title: self.title,
            content: self.content,
            severity: self.severity,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_meters: self.radius_meters,
            send_email: self.send_email,
            send_sms: self.send_sms,
            send_push: self.send_push,
            is_approved: self.is_approved,
            expires_at: self.expires_at,
            is_sent: false,
            sent_at: None,
            created_at: Utc::now(),
        })
    }
}

fn default_true() -> bool {
    true
}
