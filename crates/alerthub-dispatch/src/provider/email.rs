//! Email provider traits and the console provider.

use async_trait::async_trait;
use tracing::info;

use super::ProviderError;

/// A file attached to an email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    /// File name shown to the recipient.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Raw bytes.
    pub content: Vec<u8>,
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
    /// Attachments
    pub attachments: Vec<EmailAttachment>,
}

impl EmailMessage {
    /// Plain-text message without attachments.
    pub fn text(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            to_name: None,
            subject: subject.into(),
            body_text: body.into(),
            body_html: None,
            attachments: Vec::new(),
        }
    }
}

/// An email gateway.
///
/// Dispatchers open one connection per batch of recipients and reuse it
/// for every message in the batch.
#[async_trait]
pub trait EmailProvider: Send + Sync + std::fmt::Debug {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Open a connection for one batch.
    async fn connect(&self) -> Result<Box<dyn EmailConnection>, ProviderError>;
}

/// An open session with an email gateway.
#[async_trait]
pub trait EmailConnection: Send {
    /// Send one message.
    async fn send(&mut self, message: &EmailMessage) -> Result<(), ProviderError>;
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleEmailProvider;

struct ConsoleEmailConnection;

#[async_trait]
impl EmailProvider for ConsoleEmailProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn connect(&self) -> Result<Box<dyn EmailConnection>, ProviderError> {
        Ok(Box::new(ConsoleEmailConnection))
    }
}

#[async_trait]
impl EmailConnection for ConsoleEmailConnection {
    async fn send(&mut self, message: &EmailMessage) -> Result<(), ProviderError> {
        if message.to.trim().is_empty() {
            return Err(ProviderError::InvalidRecipient("empty address".to_string()));
        }
        info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            body = %message.body_text,
            "Email (console provider)"
        );
        Ok(())
    }
}
