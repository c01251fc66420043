//! Twilio REST API provider.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use alerthub_core::config::SmsConfig;
use alerthub_core::error::AppError;

use super::ProviderError;
use super::sms::SmsProvider;

/// Sends SMS through the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioSmsProvider {
    client: reqwest::Client,
    config: SmsConfig,
}

impl TwilioSmsProvider {
    /// Create the provider.
    ///
    /// Missing credentials are tolerated at startup; every send then
    /// fails with [`ProviderError::NotConfigured`].
    pub fn new(config: SmsConfig, timeout: Duration) -> Result<Self, AppError> {
        if !config.has_credentials() {
            warn!("Twilio credentials are incomplete, SMS delivery will be skipped");
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsProvider for TwilioSmsProvider {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        if !self.config.has_credentials() {
            return Err(ProviderError::NotConfigured(
                "Twilio account SID, auth token and sender number are required".to_string(),
            ));
        }
        if to.trim().is_empty() {
            return Err(ProviderError::InvalidRecipient("empty phone number".to_string()));
        }

        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %to, "SMS accepted by Twilio");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
