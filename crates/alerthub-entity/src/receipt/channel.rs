//! Delivery channels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A channel an alert can be delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    /// Email.
    Email,
    /// SMS.
    Sms,
    /// Push notification (not implemented by any dispatcher yet).
    Push,
}

impl DeliveryChannel {
    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Push => "push",
        }
    }

    /// Name of the receipt column tracking this channel.
    pub fn receipt_column(&self) -> &'static str {
        match self {
            Self::Email => "sent_via_email",
            Self::Sms => "sent_via_sms",
            Self::Push => "sent_via_push",
        }
    }
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
