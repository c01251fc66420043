//! HTTP mail API provider (SendGrid v3 request format).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tracing::{debug, error};

use alerthub_core::config::EmailConfig;
use alerthub_core::error::AppError;

use super::ProviderError;
use super::email::{EmailConnection, EmailMessage, EmailProvider};

/// Sends mail through a JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEmailProvider {
    config: EmailConfig,
    timeout: Duration,
}

impl HttpEmailProvider {
    /// Create the provider. Fails when no API key is configured.
    pub fn new(config: EmailConfig, timeout: Duration) -> Result<Self, AppError> {
        if config.api_key.is_empty() {
            return Err(AppError::configuration(
                "notifications.email.api_key is required for the http provider",
            ));
        }
        Ok(Self { config, timeout })
    }
}

struct HttpEmailConnection {
    client: reqwest::Client,
    config: EmailConfig,
}

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn connect(&self) -> Result<Box<dyn EmailConnection>, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Box::new(HttpEmailConnection {
            client,
            config: self.config.clone(),
        }))
    }
}

/// Build the request body for one message.
pub(crate) fn request_body(config: &EmailConfig, message: &EmailMessage) -> Value {
    let mut to = json!({ "email": message.to });
    if let Some(name) = &message.to_name {
        to["name"] = json!(name);
    }

    let mut content = vec![json!({ "type": "text/plain", "value": message.body_text })];
    if let Some(html) = &message.body_html {
        content.push(json!({ "type": "text/html", "value": html }));
    }

    let mut body = json!({
        "personalizations": [{ "to": [to] }],
        "from": { "email": config.sender_email, "name": config.sender_name },
        "subject": message.subject,
        "content": content,
    });

    if !message.attachments.is_empty() {
        let attachments: Vec<Value> = message
            .attachments
            .iter()
            .map(|a| {
                json!({
                    "content": STANDARD.encode(&a.content),
                    "filename": a.filename,
                    "type": a.content_type,
                    "disposition": "attachment",
                })
            })
            .collect();
        body["attachments"] = json!(attachments);
    }

    body
}

#[async_trait]
impl EmailConnection for HttpEmailConnection {
    async fn send(&mut self, message: &EmailMessage) -> Result<(), ProviderError> {
        if message.to.trim().is_empty() {
            return Err(ProviderError::InvalidRecipient("empty address".to_string()));
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body(&self.config, message))
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %message.to, subject = %message.subject, "Email accepted by provider");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, error = %body, "Mail API error");
        Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EmailAttachment;

    #[test]
    fn test_missing_api_key_rejected() {
        let config = EmailConfig::default();
        assert!(HttpEmailProvider::new(config, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_request_body_embeds_attachment_as_base64() {
        let config = EmailConfig::default();
        let mut message = EmailMessage::text("a@example.com", "Report", "See attached");
        message.to_name = Some("Ada".to_string());
        message.attachments.push(EmailAttachment {
            filename: "r.html".to_string(),
            content_type: "text/html".to_string(),
            content: b"hi".to_vec(),
        });

        let body = request_body(&config, &message);
        assert_eq!(body["personalizations"][0]["to"][0]["name"], "Ada");
        assert_eq!(body["subject"], "Report");
        assert_eq!(body["attachments"][0]["content"], "aGk=");
        assert_eq!(body["content"].as_array().map(Vec::len), Some(1));
    }
}
