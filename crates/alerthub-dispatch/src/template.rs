//! Message templates for alert delivery.

use chrono::{DateTime, Utc};

use alerthub_entity::alert::Alert;

/// Subject line of an alert email.
pub fn alert_subject(alert: &Alert) -> String {
    format!("ALERT: {}", alert.title)
}

/// Plain-text body of an alert email.
pub fn alert_email_body(alert: &Alert, sent_at: DateTime<Utc>) -> String {
    format!(
        "{}\n\nThis alert was sent on {}.",
        alert.content,
        sent_at.format("%d %B %Y at %H:%M")
    )
}

/// SMS text: the title plus the first `preview_chars` characters of the
/// content.
pub fn alert_sms_body(alert: &Alert, preview_chars: usize) -> String {
    format!(
        "ALERT: {} - {}",
        alert.title,
        truncate_chars(&alert.content, preview_chars)
    )
}

/// Cut `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerthub_entity::alert::CreateAlert;
    use chrono::TimeZone;

    fn alert(content: &str) -> Alert {
        CreateAlert::new("Water outage", content).into_alert().unwrap()
    }

    #[test]
    fn test_email_body_has_sent_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 3, 14, 7, 0).unwrap();
        let body = alert_email_body(&alert("Mains burst on Oak St."), at);
        assert_eq!(
            body,
            "Mains burst on Oak St.\n\nThis alert was sent on 03 May 2024 at 14:07."
        );
        assert_eq!(alert_subject(&alert("x")), "ALERT: Water outage");
    }

    #[test]
    fn test_sms_body_is_truncated() {
        let long = "a".repeat(250);
        let body = alert_sms_body(&alert(&long), 100);
        assert_eq!(body.len(), "ALERT: Water outage - ".len() + 100);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
