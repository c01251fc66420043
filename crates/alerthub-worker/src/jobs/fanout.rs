//! Alert fan-out job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use alerthub_dispatch::AlertDispatchService;
use alerthub_entity::job::payload::ALERT_FANOUT;
use alerthub_entity::job::{Job, JobPayload};

use crate::executor::{JobExecutionError, JobHandler};

/// Delivers an approved alert on every enabled channel
#[derive(Debug, Clone)]
pub struct AlertFanoutHandler {
    service: Arc<AlertDispatchService>,
}

impl AlertFanoutHandler {
    /// Create a new fan-out handler
    pub fn new(service: Arc<AlertDispatchService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl JobHandler for AlertFanoutHandler {
    fn job_type(&self) -> &str {
        ALERT_FANOUT
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobPayload::AlertFanout { alert_id } = super::payload(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} does not carry an alert fan-out payload",
                job.id
            )));
        };

        let summary = self
            .service
            .run_fanout(alert_id)
            .await
            .map_err(JobExecutionError::from_app)?;

        Ok(Some(serde_json::to_value(&summary).map_err(|e| {
            JobExecutionError::Internal(e.into())
        })?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use uuid::Uuid;

    use alerthub_core::events::EventPublisher;
    use alerthub_database::{MemoryStore, PreferenceStore};
    use alerthub_dispatch::provider::{ConsoleEmailProvider, ConsoleSmsProvider};
    use alerthub_dispatch::{EligibilityResolver, EmailDispatcher, SmsDispatcher};
    use alerthub_entity::alert::CreateAlert;
    use alerthub_entity::preference::NotificationPreference;

    use crate::queue::JobQueue;

    async fn service() -> (Arc<AlertDispatchService>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(JobQueue::new(16, 16));
        let (events, _rx) = EventPublisher::channel(16);
        let timeout = Duration::from_secs(1);
        let service = AlertDispatchService::new(
            store.clone(),
            store.clone(),
            EligibilityResolver::new(store.clone()),
            EmailDispatcher::new(Arc::new(ConsoleEmailProvider), store.clone(), 50, timeout),
            SmsDispatcher::new(
                Arc::new(ConsoleSmsProvider),
                store.clone(),
                queue.clone(),
                100,
                timeout,
            ),
            queue,
            events,
        );
        (Arc::new(service), store)
    }

    #[tokio::test]
    async fn test_fanout_returns_summary() {
        let (service, store) = service().await;
        store
            .upsert(&NotificationPreference::new(Uuid::new_v4(), "A", "a@example.com"))
            .await
            .unwrap();
        let alert = service
            .create_alert(CreateAlert::new("Fire", "Evacuate"))
            .await
            .unwrap();

        let handler = AlertFanoutHandler::new(service);
        let payload = JobPayload::AlertFanout { alert_id: alert.id };
        let job = Job::new(ALERT_FANOUT, payload.to_value().unwrap());

        let result = handler.execute(&job).await.unwrap().unwrap();
        assert_eq!(result["email_sent"], 1);
        assert_eq!(result["total_candidates"], 1);
    }

    #[tokio::test]
    async fn test_unknown_alert_is_permanent() {
        let (service, _store) = service().await;
        let handler = AlertFanoutHandler::new(service);
        let payload = JobPayload::AlertFanout {
            alert_id: Uuid::new_v4(),
        };
        let job = Job::new(ALERT_FANOUT, payload.to_value().unwrap());

        let err = handler.execute(&job).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_permanent() {
        let (service, _store) = service().await;
        let handler = AlertFanoutHandler::new(service);
        let job = Job::new(ALERT_FANOUT, json!({"alert_id": "not-a-uuid"}));

        let err = handler.execute(&job).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
