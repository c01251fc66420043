//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use alerthub_entity::job::JobStatus;
use alerthub_worker::QueueStats;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A bare count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count.
    pub count: i64,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Outcome of recording a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewResponse {
    /// Whether this was the user's first view of the alert.
    pub first_view: bool,
}

/// A job that was accepted into the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    /// Job ID.
    pub job_id: Uuid,
    /// Job type.
    pub job_type: String,
    /// Status at acceptance.
    pub status: JobStatus,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Live WebSocket connections.
    pub ws_connections: usize,
    /// Job queue counters.
    pub queue: QueueStats,
}
