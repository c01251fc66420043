//! Bounded in-process job queue.

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify, mpsc};
use uuid::Uuid;

use alerthub_core::config::WorkerConfig;
use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;
use alerthub_core::traits::TaskQueue;
use alerthub_entity::job::{Job, JobStatus};

/// Job queue for enqueuing and dequeuing work
///
/// Job records live in memory. Finished jobs are kept for inspection up
/// to `history_limit`, oldest evicted first.
///
/// `capacity` bounds the waiting jobs admitted through [`enqueue_job`].
/// Follow-up jobs queued by running work bypass it, so a fan-out never
/// drops the deliveries it has already claimed.
///
/// [`enqueue_job`]: JobQueue::enqueue_job
#[derive(Debug)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Uuid>,
    receiver: Mutex<mpsc::UnboundedReceiver<Uuid>>,
    waiting: AtomicUsize,
    jobs: DashMap<Uuid, Job>,
    history: StdMutex<VecDeque<Uuid>>,
    history_limit: usize,
    capacity: usize,
    finished: Notify,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl JobQueue {
    /// Create a queue holding at most `capacity` waiting jobs
    pub fn new(capacity: usize, history_limit: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            waiting: AtomicUsize::new(0),
            jobs: DashMap::new(),
            history: StdMutex::new(VecDeque::new()),
            history_limit,
            capacity,
            finished: Notify::new(),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Create a queue from the worker settings
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(config.queue_capacity, config.history_limit)
    }

    /// Enqueue a new job. Fails without blocking when the queue is full.
    pub fn enqueue_job(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Job> {
        let admitted = self
            .waiting
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |waiting| {
                (waiting < self.capacity).then_some(waiting + 1)
            })
            .is_ok();
        if !admitted {
            tracing::warn!("Rejected job type='{}': Job queue is full", job_type);
            return Err(AppError::service_unavailable("Job queue is full"));
        }
        self.push(job_type, payload)
    }

    /// Enqueue a job spawned by running work. Never rejected for capacity.
    pub fn enqueue_follow_up_job(
        &self,
        job_type: &str,
        payload: serde_json::Value,
    ) -> AppResult<Job> {
        self.waiting.fetch_add(1, Ordering::AcqRel);
        self.push(job_type, payload)
    }

    fn push(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Job> {
        let job = Job::new(job_type, payload);
        self.jobs.insert(job.id, job.clone());

        if self.sender.send(job.id).is_err() {
            self.jobs.remove(&job.id);
            self.waiting.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!("Rejected job type='{}': Job queue is closed", job_type);
            return Err(AppError::service_unavailable("Job queue is closed"));
        }

        tracing::debug!("Enqueued job: id={}, type='{}'", job.id, job.job_type);
        Ok(job)
    }

    /// Wait for the next job and mark it running
    pub async fn dequeue(&self) -> Option<Job> {
        let mut receiver = self.receiver.lock().await;
        loop {
            let id = receiver.recv().await?;
            self.waiting.fetch_sub(1, Ordering::AcqRel);
            let Some(mut entry) = self.jobs.get_mut(&id) else {
                continue;
            };
            entry.status = JobStatus::Running;
            entry.attempts += 1;
            entry.started_at = Some(Utc::now());
            tracing::debug!("Dequeued job: id={}, type='{}'", entry.id, entry.job_type);
            return Some(entry.value().clone());
        }
    }

    /// Mark a job as completed successfully
    pub fn complete(&self, job_id: Uuid, result: Option<serde_json::Value>) {
        self.finish(job_id, JobStatus::Completed, result, None);
        self.completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Job completed: id={}", job_id);
    }

    /// Mark a job as failed. Failed jobs are not retried.
    pub fn fail(&self, job_id: Uuid, error: &str) {
        self.finish(job_id, JobStatus::Failed, None, Some(error.to_string()));
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Job failed: id={}, error='{}'", job_id, error);
    }

    fn finish(
        &self,
        job_id: Uuid,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) {
        if let Some(mut job) = self.jobs.get_mut(&job_id) {
            job.status = status;
            job.result = result;
            job.error_message = error;
            job.finished_at = Some(Utc::now());
        }
        self.remember(job_id);
        self.finished.notify_waiters();
    }

    fn remember(&self, job_id: Uuid) {
        let evicted: Vec<Uuid> = match self.history.lock() {
            Ok(mut history) => {
                history.push_back(job_id);
                let excess = history.len().saturating_sub(self.history_limit);
                history.drain(..excess).collect()
            }
            Err(_) => Vec::new(),
        };
        for id in evicted {
            self.jobs.remove(&id);
        }
    }

    /// Look up a job
    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.jobs.get(&job_id).map(|job| job.value().clone())
    }

    /// Wait until a job has finished
    pub async fn wait(&self, job_id: Uuid) -> AppResult<Job> {
        loop {
            let notified = self.finished.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.get(job_id) {
                None => return Err(AppError::not_found(format!("Job {job_id} not found"))),
                Some(job) if job.status.is_terminal() => return Ok(job),
                Some(_) => {}
            }
            notified.await;
        }
    }

    /// Wait until no job is pending or running
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.finished.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let stats = self.stats();
            if stats.pending == 0 && stats.running == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        let mut pending = 0;
        let mut running = 0;
        for job in self.jobs.iter() {
            match job.status {
                JobStatus::Pending => pending += 1,
                JobStatus::Running => running += 1,
                _ => {}
            }
        }
        QueueStats {
            pending,
            running,
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            capacity: self.capacity,
        }
    }
}

#[async_trait]
impl TaskQueue for JobQueue {
    async fn enqueue(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Uuid> {
        self.enqueue_job(job_type, payload).map(|job| job.id)
    }

    async fn enqueue_follow_up(
        &self,
        job_type: &str,
        payload: serde_json::Value,
    ) -> AppResult<Uuid> {
        self.enqueue_follow_up_job(job_type, payload).map(|job| job.id)
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of pending jobs
    pub pending: u64,
    /// Number of running jobs
    pub running: u64,
    /// Jobs completed since start
    pub completed: u64,
    /// Jobs failed since start
    pub failed: u64,
    /// Maximum waiting jobs
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerthub_core::error::ErrorKind;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fifo_and_running_state() {
        let queue = JobQueue::new(4, 10);
        let a = queue.enqueue_job("a", json!({})).unwrap();
        let b = queue.enqueue_job("b", json!({})).unwrap();

        let first = queue.dequeue().await.unwrap();
        assert_eq!(first.id, a.id);
        assert_eq!(first.status, JobStatus::Running);
        assert_eq!(first.attempts, 1);
        assert_eq!(queue.stats().pending, 1);
        assert_eq!(queue.dequeue().await.unwrap().id, b.id);
    }

    #[tokio::test]
    async fn test_full_queue_rejects() {
        let queue = JobQueue::new(1, 10);
        queue.enqueue_job("a", json!({})).unwrap();
        let err = queue.enqueue_job("b", json!({})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(queue.stats().pending, 1);
    }

    #[tokio::test]
    async fn test_follow_up_jobs_bypass_capacity() {
        let queue = JobQueue::new(1, 10);
        queue.enqueue_job("a", json!({})).unwrap();
        for _ in 0..3 {
            queue.enqueue_follow_up_job("sms", json!({})).unwrap();
        }
        assert_eq!(queue.stats().pending, 4);
        assert!(queue.enqueue_job("b", json!({})).is_err());

        for _ in 0..4 {
            let job = queue.dequeue().await.unwrap();
            queue.complete(job.id, None);
        }
        assert!(queue.enqueue_job("c", json!({})).is_ok());
    }

    #[tokio::test]
    async fn test_wait_returns_finished_job() {
        let queue = Arc::new(JobQueue::new(4, 10));
        let job = queue.enqueue_job("a", json!({})).unwrap();

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait(job.id).await })
        };
        let running = queue.dequeue().await.unwrap();
        queue.complete(running.id, Some(json!({"ok": true})));

        let done = waiter.await.unwrap().unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.result, Some(json!({"ok": true})));
        assert_eq!(queue.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_wait_idle_after_last_job() {
        let queue = Arc::new(JobQueue::new(4, 10));
        queue.wait_idle().await;

        queue.enqueue_job("a", json!({})).unwrap();
        queue.enqueue_job("b", json!({})).unwrap();
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_idle().await })
        };
        for _ in 0..2 {
            let job = queue.dequeue().await.unwrap();
            queue.complete(job.id, None);
        }
        waiter.await.unwrap();
        assert_eq!(queue.stats().completed, 2);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let queue = JobQueue::new(8, 2);
        let mut ids = Vec::new();
        for _ in 0..3 {
            let job = queue.enqueue_job("a", json!({})).unwrap();
            ids.push(job.id);
            let job = queue.dequeue().await.unwrap();
            queue.fail(job.id, "boom");
        }
        assert!(queue.get(ids[0]).is_none());
        assert_eq!(queue.get(ids[2]).unwrap().error_message.as_deref(), Some("boom"));
        assert_eq!(queue.stats().failed, 3);
    }
}
