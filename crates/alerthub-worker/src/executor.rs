//! Job executor: dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use alerthub_core::error::AppError;
use alerthub_entity::job::Job;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Execute the job with the given payload
    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution.
///
/// Every variant is terminal: failed jobs are recorded, never re-queued.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// The job can never succeed (bad payload, unknown alert, ...)
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// A dependency failed; a later, separate run might succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl JobExecutionError {
    /// Classify an application error: rejections are permanent.
    pub fn from_app(err: AppError) -> Self {
        if err.is_rejection() {
            Self::Permanent(err.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

/// Dispatches jobs to the appropriate handler based on job_type
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Execute a job by dispatching to the correct handler
    pub async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(&job.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job.job_type
            ))
        })?;

        tracing::info!(
            "Executing job: id={}, type='{}', attempt={}",
            job.id,
            job.job_type,
            job.attempts
        );

        handler.execute(job).await
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl JobHandler for Echo {
        fn job_type(&self) -> &str {
            "echo"
        }

        async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
            Ok(Some(job.payload.clone()))
        }
    }

    #[tokio::test]
    async fn test_dispatches_by_type() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Echo));
        assert!(executor.has_handler("echo"));

        let job = Job::new("echo", serde_json::json!({"n": 1}));
        let out = executor.execute(&job).await.unwrap();
        assert_eq!(out, Some(serde_json::json!({"n": 1})));
    }

    #[tokio::test]
    async fn test_unknown_type_is_permanent() {
        let executor = JobExecutor::new();
        let job = Job::new("thumbnail", Value::Null);
        assert!(matches!(
            executor.execute(&job).await,
            Err(JobExecutionError::Permanent(_))
        ));
    }

    #[test]
    fn test_rejections_are_permanent() {
        assert!(matches!(
            JobExecutionError::from_app(AppError::not_found("gone")),
            JobExecutionError::Permanent(_)
        ));
        assert!(matches!(
            JobExecutionError::from_app(AppError::database("down")),
            JobExecutionError::Internal(_)
        ));
    }
}
