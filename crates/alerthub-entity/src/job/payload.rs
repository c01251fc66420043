//! Typed job payload definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;

/// Job type of [`JobPayload::AlertFanout`].
pub const ALERT_FANOUT: &str = "alert_fanout";
/// Job type of [`JobPayload::SmsDelivery`].
pub const SMS_DELIVERY: &str = "sms_delivery";
/// Job type of [`JobPayload::MonthlyReport`].
pub const MONTHLY_REPORT: &str = "monthly_report";

/// Typed payloads for known job types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum JobPayload {
    /// Resolve recipients for an alert and deliver on every enabled channel.
    #[serde(rename = "alert_fanout")]
    AlertFanout {
        /// Alert to deliver.
        alert_id: Uuid,
    },
    /// Send one text message.
    #[serde(rename = "sms_delivery")]
    SmsDelivery {
        /// Destination phone number.
        to: String,
        /// Message text.
        body: String,
        /// Alert the message belongs to, if any.
        alert_id: Option<Uuid>,
        /// Recipient, if known.
        user_id: Option<Uuid>,
    },
    /// Generate (and optionally distribute) the monthly report.
    #[serde(rename = "monthly_report")]
    MonthlyReport {
        /// Report year; previous month when both are omitted.
        year: Option<i32>,
        /// Report month.
        month: Option<u32>,
        /// Mail the document to opted-in users.
        send: bool,
    },
}

impl JobPayload {
    /// The job type string this payload is registered under.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::AlertFanout { .. } => ALERT_FANOUT,
            Self::SmsDelivery { .. } => SMS_DELIVERY,
            Self::MonthlyReport { .. } => MONTHLY_REPORT,
        }
    }

    /// Serialize into the JSON stored on the job.
    pub fn to_value(&self) -> AppResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse the JSON stored on a job.
    pub fn from_value(value: &serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| AppError::validation(format!("Malformed job payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_its_job_type() {
        let payload = JobPayload::AlertFanout {
            alert_id: Uuid::nil(),
        };
        let value = payload.to_value().unwrap();
        assert_eq!(value["job_type"], ALERT_FANOUT);
        assert_eq!(JobPayload::from_value(&value).unwrap(), payload);
    }

    #[test]
    fn test_unknown_job_type_is_rejected() {
        let value = serde_json::json!({"job_type": "thumbnail"});
        assert!(JobPayload::from_value(&value).is_err());
    }
}
