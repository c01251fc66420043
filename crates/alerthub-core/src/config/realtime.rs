//! Broadcast bus configuration.

use serde::{Deserialize, Serialize};

/// Real-time broadcast bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per connection. A full buffer drops messages for
    /// that client only.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Buffer of the domain event channel feeding the bridge.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
    /// Topic that crime report events are published to.
    #[serde(default = "default_crime_alert_topic")]
    pub crime_alert_topic: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            event_buffer_size: default_event_buffer(),
            crime_alert_topic: default_crime_alert_topic(),
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}

fn default_event_buffer() -> usize {
    256
}

fn default_crime_alert_topic() -> String {
    "crime_alerts".to_string()
}
