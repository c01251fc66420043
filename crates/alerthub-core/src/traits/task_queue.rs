//! Seam between the code that triggers work and the background worker.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// A queue accepting background jobs.
///
/// Enqueueing never runs the job; it only hands it to the worker pool
/// and returns the job ID. Jobs may run more than once from the queue's
/// point of view, so handlers must be idempotent.
#[async_trait]
pub trait TaskQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Enqueue a job of the given type with a JSON payload.
    async fn enqueue(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Uuid>;

    /// Enqueue a job produced by work that is already running, such as
    /// the per-recipient SMS jobs of a fan-out.
    ///
    /// Bounded queues must admit these past their capacity. Callers
    /// record delivery state before handing the job over, so rejecting
    /// here would lose the delivery for good.
    async fn enqueue_follow_up(
        &self,
        job_type: &str,
        payload: serde_json::Value,
    ) -> AppResult<Uuid> {
        self.enqueue(job_type, payload).await
    }
}
