//! Receipt entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::channel::DeliveryChannel;

/// Per-recipient delivery and view record, unique per (alert, user).
///
/// Flags only ever move from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    /// Alert this receipt belongs to.
    pub alert_id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    /// Email delivery claimed.
    pub sent_via_email: bool,
    /// SMS delivery claimed.
    pub sent_via_sms: bool,
    /// Push delivery claimed.
    pub sent_via_push: bool,
    /// The recipient opened the alert.
    pub viewed: bool,
    /// First time the recipient opened the alert.
    pub viewed_at: Option<DateTime<Utc>>,
    /// When the receipt was created.
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// A fresh receipt with every flag cleared.
    pub fn new(alert_id: Uuid, user_id: Uuid) -> Self {
        Self {
            alert_id,
            user_id,
            sent_via_email: false,
            sent_via_sms: false,
            sent_via_push: false,
            viewed: false,
            viewed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Whether delivery through `channel` was already claimed.
    pub fn is_sent_via(&self, channel: DeliveryChannel) -> bool {
        match channel {
            DeliveryChannel::Email => self.sent_via_email,
            DeliveryChannel::Sms => self.sent_via_sms,
            DeliveryChannel::Push => self.sent_via_push,
        }
    }

    /// Flip the flag for `channel`. Returns `false` when it was already set.
    pub fn claim(&mut self, channel: DeliveryChannel) -> bool {
        let flag = match channel {
            DeliveryChannel::Email => &mut self.sent_via_email,
            DeliveryChannel::Sms => &mut self.sent_via_sms,
            DeliveryChannel::Push => &mut self.sent_via_push,
        };
        if *flag {
            return false;
        }
        *flag = true;
        true
    }

    /// Record the first view. Returns `false` when already viewed.
    pub fn mark_viewed(&mut self, now: DateTime<Utc>) -> bool {
        if self.viewed {
            return false;
        }
        self.viewed = true;
        self.viewed_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_only_succeeds_once() {
        let mut receipt = Receipt::new(Uuid::new_v4(), Uuid::new_v4());
        assert!(receipt.claim(DeliveryChannel::Email));
        assert!(!receipt.claim(DeliveryChannel::Email));
        assert!(receipt.is_sent_via(DeliveryChannel::Email));
        assert!(!receipt.is_sent_via(DeliveryChannel::Sms));
    }

    #[test]
    fn test_view_keeps_first_timestamp() {
        let mut receipt = Receipt::new(Uuid::new_v4(), Uuid::new_v4());
        let first = Utc::now();
        assert!(receipt.mark_viewed(first));
        assert!(!receipt.mark_viewed(first + chrono::Duration::minutes(5)));
        assert_eq!(receipt.viewed_at, Some(first));
    }
}
