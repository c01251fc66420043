//! Notification preference entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user contact details and channel opt-ins.
///
/// Every user has exactly one record; both opt-ins default to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    /// The user these preferences belong to.
    pub user_id: Uuid,
    /// Name used to greet the user in mail.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Phone number for SMS.
    pub phone_number: Option<String>,
    /// Opted in to email.
    pub email_notifications: bool,
    /// Opted in to SMS.
    pub sms_notifications: bool,
    /// When preferences were last updated.
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Create default preferences for a user.
    pub fn new(user_id: Uuid, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email: email.into(),
            phone_number: None,
            email_notifications: true,
            sms_notifications: true,
            updated_at: Utc::now(),
        }
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    /// The phone number, if present and non-blank.
    pub fn phone(&self) -> Option<&str> {
        self.phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Name to greet the user with, falling back to the email address.
    pub fn greeting_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}
