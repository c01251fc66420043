//! Outbound frame format.

use serde::{Deserialize, Serialize};

/// The JSON object pushed to clients: `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Human readable text.
    pub message: String,
}

impl BroadcastMessage {
    /// Wrap a text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
