//! Email and SMS provider configuration.

use serde::{Deserialize, Serialize};

/// Outbound notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Upper bound for a single provider call, in seconds.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_seconds: u64,
    /// Characters of alert content included in an SMS.
    #[serde(default = "default_sms_preview_chars")]
    pub sms_preview_chars: usize,
    /// Email provider settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// SMS provider settings.
    #[serde(default)]
    pub sms: SmsConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            provider_timeout_seconds: default_provider_timeout(),
            sms_preview_chars: default_sms_preview_chars(),
            email: EmailConfig::default(),
            sms: SmsConfig::default(),
        }
    }
}

/// Email provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Provider: `"console"` or `"http"`.
    #[serde(default = "default_console")]
    pub provider: String,
    /// Endpoint of the HTTP mail API.
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    /// Bearer token for the HTTP mail API.
    #[serde(default)]
    pub api_key: String,
    /// From address.
    #[serde(default = "default_sender_email")]
    pub sender_email: String,
    /// From display name.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Recipients sharing one provider connection.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_console(),
            api_url: default_email_api_url(),
            api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            batch_size: default_batch_size(),
        }
    }
}

/// SMS provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Provider: `"console"` or `"twilio"`.
    #[serde(default = "default_console")]
    pub provider: String,
    /// REST API base URL.
    #[serde(default = "default_sms_api_base")]
    pub api_base: String,
    /// Account SID.
    #[serde(default)]
    pub account_sid: String,
    /// Auth token.
    #[serde(default)]
    pub auth_token: String,
    /// Sending phone number.
    #[serde(default)]
    pub from_number: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: default_console(),
            api_base: default_sms_api_base(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
        }
    }
}

impl SmsConfig {
    /// Whether credentials are present for the configured provider.
    pub fn has_credentials(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

fn default_provider_timeout() -> u64 {
    10
}

fn default_sms_preview_chars() -> usize {
    100
}

fn default_console() -> String {
    "console".to_string()
}

fn default_email_api_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_sender_email() -> String {
    "alerts@kingspark.local".to_string()
}

fn default_sender_name() -> String {
    "KingsPark Alerts".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_sms_api_base() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}
