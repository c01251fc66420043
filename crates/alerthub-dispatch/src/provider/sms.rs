//! SMS provider trait and the console provider.

use async_trait::async_trait;
use tracing::info;

use super::ProviderError;

/// An SMS gateway.
#[async_trait]
pub trait SmsProvider: Send + Sync + std::fmt::Debug {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Send one text message.
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError>;
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSmsProvider;

#[async_trait]
impl SmsProvider for ConsoleSmsProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        if to.trim().is_empty() {
            return Err(ProviderError::InvalidRecipient("empty phone number".to_string()));
        }
        info!(to = %to, body = %body, "SMS (console provider)");
        Ok(())
    }
}
