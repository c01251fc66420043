//! SMS delivery job handler.

use async_trait::async_trait;
use serde_json::{Value, json};

use alerthub_dispatch::SmsDispatcher;
use alerthub_entity::job::payload::SMS_DELIVERY;
use alerthub_entity::job::{Job, JobPayload};

use crate::executor::{JobExecutionError, JobHandler};

/// Sends one queued text message
#[derive(Debug, Clone)]
pub struct SmsDeliveryHandler {
    sms: SmsDispatcher,
}

impl SmsDeliveryHandler {
    /// Create a new SMS handler
    pub fn new(sms: SmsDispatcher) -> Self {
        Self { sms }
    }
}

#[async_trait]
impl JobHandler for SmsDeliveryHandler {
    fn job_type(&self) -> &str {
        SMS_DELIVERY
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobPayload::SmsDelivery {
            to,
            body,
            alert_id,
            user_id,
        } = super::payload(job)?
        else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} does not carry an SMS payload",
                job.id
            )));
        };

        // The receipt flag is already set, so a failed send is not retried.
        if let Err(e) = self.sms.deliver(&to, &body).await {
            tracing::error!(
                to = %to,
                alert_id = ?alert_id,
                user_id = ?user_id,
                error = %e,
                "Error sending SMS"
            );
            return Err(JobExecutionError::Permanent(e.to_string()));
        }

        Ok(Some(json!({ "to": to, "alert_id": alert_id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use alerthub_database::MemoryStore;
    use alerthub_dispatch::provider::ConsoleSmsProvider;

    use crate::queue::JobQueue;

    fn handler() -> SmsDeliveryHandler {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(JobQueue::new(4, 4));
        SmsDeliveryHandler::new(SmsDispatcher::new(
            Arc::new(ConsoleSmsProvider),
            store,
            queue,
            100,
            Duration::from_secs(1),
        ))
    }

    fn job(to: &str) -> Job {
        let payload = JobPayload::SmsDelivery {
            to: to.to_string(),
            body: "ALERT: Fire - Evacuate".to_string(),
            alert_id: None,
            user_id: None,
        };
        Job::new(SMS_DELIVERY, payload.to_value().unwrap())
    }

    #[tokio::test]
    async fn test_delivers_message() {
        let result = handler().execute(&job("+15550001")).await.unwrap().unwrap();
        assert_eq!(result["to"], "+15550001");
    }

    #[tokio::test]
    async fn test_provider_failure_is_permanent() {
        let err = handler().execute(&job("  ")).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
