//! Recipient selection rules.

use serde::{Deserialize, Serialize};

use super::model::NotificationPreference;

/// Which users qualify as recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientFilter {
    /// `email_notifications = true`.
    EmailOptIn,
    /// `sms_notifications = true` and a non-empty phone number.
    SmsOptIn,
    /// Any non-empty phone number, regardless of opt-in.
    HasPhone,
}

impl RecipientFilter {
    /// Whether `pref` passes this filter.
    pub fn matches(&self, pref: &NotificationPreference) -> bool {
        match self {
            Self::EmailOptIn => pref.email_notifications,
            Self::SmsOptIn => pref.sms_notifications && pref.phone().is_some(),
            Self::HasPhone => pref.phone().is_some(),
        }
    }
}
