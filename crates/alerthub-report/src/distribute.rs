//! Report mail-out.

use tracing::{error, info};

use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_dispatch::provider::EmailAttachment;
use alerthub_dispatch::{DeliveryTally, EligibilityResolver, EmailDispatcher, EmailMessage};
use alerthub_entity::preference::NotificationPreference;

use crate::document::{ReportDocument, escape};

/// Mails a generated report to every email-opted-in user.
#[derive(Debug, Clone)]
pub struct ReportDistributor {
    resolver: EligibilityResolver,
    email: EmailDispatcher,
    brand: String,
}

impl ReportDistributor {
    /// Create a distributor.
    pub fn new(resolver: EligibilityResolver, email: EmailDispatcher, brand: impl Into<String>) -> Self {
        Self {
            resolver,
            email,
            brand: brand.into(),
        }
    }

    /// Attachment file name for a document.
    pub fn attachment_name(&self, document: &ReportDocument) -> String {
        format!(
            "{}_Crime_Report_{}_{}.html",
            self.brand,
            document.period.month_name(),
            document.period.year()
        )
    }

    /// Send the document. Per-recipient failures only show up in the
    /// tally.
    pub async fn distribute(&self, document: &ReportDocument) -> AppResult<DeliveryTally> {
        let recipients = self.resolver.email_recipients().await?;
        if recipients.is_empty() {
            info!(period = %document.period, "No users found with email notifications enabled");
            return Ok(DeliveryTally::default());
        }

        let content = tokio::fs::read(&document.path).await.map_err(|e| {
            error!(path = %document.path.display(), error = %e, "Report document not found");
            AppError::with_source(
                ErrorKind::Storage,
                format!("Report document {} not readable", document.path.display()),
                e,
            )
        })?;

        let attachment = EmailAttachment {
            filename: self.attachment_name(document),
            content_type: "text/html".to_string(),
            content,
        };

        let messages: Vec<EmailMessage> = recipients
            .iter()
            .map(|pref| self.message_for(pref, document, attachment.clone()))
            .collect();

        let tally = self.email.send_batched(&messages).await;
        info!(
            period = %document.period,
            delivered = tally.delivered,
            total = recipients.len(),
            "Successfully sent {}/{} monthly crime report emails",
            tally.delivered,
            recipients.len()
        );
        Ok(tally)
    }

    fn message_for(
        &self,
        pref: &NotificationPreference,
        document: &ReportDocument,
        attachment: EmailAttachment,
    ) -> EmailMessage {
        let name = pref.greeting_name();
        let period = document.period.display_name();
        let body_text = format!(
            "Dear {name},\n\n\
             Attached is the {brand} crime report for {period}. It summarises {total} crimes \
             reported during the month by category, status, day and location.\n\n\
             Stay safe,\nThe {brand} Community Policing Forum",
            brand = self.brand,
            total = document.stats.total,
        );
        let body_html = format!(
            "<p>Dear {html_name},</p>\
             <p>Attached is the <strong>{brand}</strong> crime report for {period}. \
             It summarises {total} crimes reported during the month by category, status, day and location.</p>\
             <p>Stay safe,<br>The {brand} Community Policing Forum</p>",
            html_name = escape(name),
            brand = self.brand,
            total = document.stats.total,
        );

        EmailMessage {
            to: pref.email.clone(),
            to_name: Some(name.to_string()),
            subject: document.title.clone(),
            body_text,
            body_html: Some(body_html),
            attachments: vec![attachment],
        }
    }
}
