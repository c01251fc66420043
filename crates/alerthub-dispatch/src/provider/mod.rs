//! Outbound email and SMS gateways.
//!
//! Supported providers:
//! - email `console`: logs messages (development)
//! - email `http`: JSON mail API with bearer token (SendGrid v3 format)
//! - sms `console`: logs messages (development)
//! - sms `twilio`: REST form post with basic auth

pub mod email;
pub mod http_email;
pub mod sms;
pub mod twilio;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use alerthub_core::config::NotificationConfig;
use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;

pub use email::{ConsoleEmailProvider, EmailAttachment, EmailConnection, EmailMessage, EmailProvider};
pub use http_email::HttpEmailProvider;
pub use sms::{ConsoleSmsProvider, SmsProvider};
pub use twilio::TwilioSmsProvider;

/// Errors that can occur while talking to a gateway.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials or endpoint are missing.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The recipient address or number is unusable.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The request could not be sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The gateway answered with a non-success status.
    #[error("Provider returned {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The call did not finish in time.
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::with_source(ErrorKind::Provider, err.to_string(), err)
    }
}

/// Run a provider future under a deadline.
pub(crate) async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, ProviderError>
where
    F: std::future::Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ProviderError::Timeout(limit))?
}

/// Build the configured email provider.
pub fn build_email_provider(config: &NotificationConfig) -> AppResult<Arc<dyn EmailProvider>> {
    let timeout = Duration::from_secs(config.provider_timeout_seconds);
    let provider: Arc<dyn EmailProvider> = match config.email.provider.as_str() {
        "console" => Arc::new(ConsoleEmailProvider),
        "http" => Arc::new(HttpEmailProvider::new(config.email.clone(), timeout)?),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown email provider '{other}'"
            )));
        }
    };
    info!(provider = provider.name(), "Email provider ready");
    Ok(provider)
}

/// Build the configured SMS provider.
pub fn build_sms_provider(config: &NotificationConfig) -> AppResult<Arc<dyn SmsProvider>> {
    let timeout = Duration::from_secs(config.provider_timeout_seconds);
    let provider: Arc<dyn SmsProvider> = match config.sms.provider.as_str() {
        "console" => Arc::new(ConsoleSmsProvider),
        "twilio" => Arc::new(TwilioSmsProvider::new(config.sms.clone(), timeout)?),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown SMS provider '{other}'"
            )));
        }
    };
    info!(provider = provider.name(), "SMS provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_maps_to_provider_error() {
        let result: Result<(), ProviderError> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ProviderError::Timeout(_))));
    }

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let mut config = NotificationConfig::default();
        config.email.provider = "pigeon".to_string();
        let err = build_email_provider(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_provider_error_converts_to_provider_kind() {
        let err: AppError = ProviderError::Request("connection reset".into()).into();
        assert_eq!(err.kind, ErrorKind::Provider);
    }
}
