//! Worker runner: main loop that takes queued jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tracing;

use alerthub_core::config::WorkerConfig;
use alerthub_entity::job::Job;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Runs queued jobs on a bounded pool of tasks
#[derive(Debug)]
pub struct WorkerRunner {
    /// Job queue to take work from
    queue: Arc<JobQueue>,
    /// Job executor for dispatching
    executor: Arc<JobExecutor>,
    /// Worker configuration
    config: WorkerConfig,
    /// Worker identifier
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id: worker_id.into(),
        }
    }

    /// Start the worker runner: runs until the cancel signal is received
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            "Worker '{}' started with concurrency={}, queue_capacity={}",
            self.worker_id,
            concurrency,
            self.config.queue_capacity
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));

        loop {
            let permit = tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Worker '{}' received shutdown signal", self.worker_id);
                        break;
                    }
                    continue;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let job = tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Worker '{}' shutting down", self.worker_id);
                        break;
                    }
                    continue;
                }
                job = self.queue.dequeue() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            let queue = Arc::clone(&self.queue);
            let executor = Arc::clone(&self.executor);
            tokio::spawn(async move {
                let _permit = permit;
                process(&queue, &executor, job).await;
            });
        }

        tracing::info!(
            "Worker '{}' waiting for in-flight jobs to complete...",
            self.worker_id
        );

        let drain = Duration::from_secs(self.config.shutdown_timeout_seconds);
        if tokio::time::timeout(drain, semaphore.acquire_many(concurrency as u32))
            .await
            .is_err()
        {
            tracing::warn!(
                "Worker '{}' gave up waiting for in-flight jobs after {:?}",
                self.worker_id,
                drain
            );
        }

        tracing::info!("Worker '{}' shut down complete", self.worker_id);
    }
}

/// Execute one job and record its outcome. Failures are final.
pub async fn process(queue: &JobQueue, executor: &JobExecutor, job: Job) {
    let job_id = job.id;
    tracing::info!("Processing job: id={}, type='{}'", job_id, job.job_type);

    match executor.execute(&job).await {
        Ok(result) => {
            queue.complete(job_id, result);
            tracing::info!("Job {} completed successfully", job_id);
        }
        Err(JobExecutionError::Transient(msg)) => {
            tracing::warn!("Job {} failed (transient, not retried): {}", job_id, msg);
            queue.fail(job_id, &msg);
        }
        Err(JobExecutionError::Permanent(msg)) => {
            tracing::error!("Job {} failed permanently: {}", job_id, msg);
            queue.fail(job_id, &msg);
        }
        Err(JobExecutionError::Internal(err)) => {
            let msg = err.to_string();
            tracing::error!("Job {} internal error: {}", job_id, msg);
            queue.fail(job_id, &msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alerthub_entity::job::JobStatus;

    use crate::executor::JobHandler;

    #[derive(Debug, Default)]
    struct Flaky {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for Flaky {
        fn job_type(&self) -> &str {
            "flaky"
        }

        async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if job.payload["fail"] == json!(true) {
                return Err(JobExecutionError::Transient("gateway down".into()));
            }
            Ok(Some(json!({"done": true})))
        }
    }

    fn config() -> WorkerConfig {
        WorkerConfig {
            concurrency: 2,
            shutdown_timeout_seconds: 1,
            ..WorkerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_runs_jobs_and_never_retries() {
        let queue = Arc::new(JobQueue::new(16, 16));
        let handler = Arc::new(Flaky::default());
        let mut executor = JobExecutor::new();
        executor.register(handler.clone());

        let runner = WorkerRunner::new(queue.clone(), Arc::new(executor), config(), "test");
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(async move { runner.run(cancel_rx).await });

        let ok = queue.enqueue_job("flaky", json!({})).unwrap();
        let bad = queue.enqueue_job("flaky", json!({"fail": true})).unwrap();

        assert_eq!(queue.wait(ok.id).await.unwrap().status, JobStatus::Completed);
        let failed = queue.wait(bad.id).await.unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.attempts, 1);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);

        cancel_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
