//! Cron scheduler for periodic tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use alerthub_core::error::AppError;
use alerthub_core::traits::TaskQueue;
use alerthub_entity::job::JobPayload;

/// Cron-based scheduler that queues periodic jobs
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Job queue for enqueuing scheduled work
    queue: Arc<dyn TaskQueue>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(queue: Arc<dyn TaskQueue>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, queue })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Monthly report for the previous month, on `schedule`
    pub async fn register_monthly_report(&self, schedule: &str, send: bool) -> Result<(), AppError> {
        let payload = monthly_report_payload(send)?;
        let queue = Arc::clone(&self.queue);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            let payload = payload.clone();
            Box::pin(async move {
                tracing::debug!("Scheduling monthly report job");
                if let Err(e) = queue.enqueue(&payload.0, payload.1).await {
                    tracing::error!("Failed to enqueue monthly_report: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid monthly report schedule '{}': {}",
                schedule, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add monthly_report schedule: {}", e))
        })?;

        tracing::info!("Registered: monthly_report ({}, send={})", schedule, send);
        Ok(())
    }
}

/// Job type and payload queued by the monthly trigger.
fn monthly_report_payload(send: bool) -> Result<(String, serde_json::Value), AppError> {
    let payload = JobPayload::MonthlyReport {
        year: None,
        month: None,
        send,
    };
    Ok((payload.job_type().to_string(), payload.to_value()?))
}
