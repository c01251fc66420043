//! Domain events emitted by AlertHub write paths.
//!
//! Side effects of persisting a record (broadcasting a new crime report,
//! announcing a dispatched alert) are expressed as events and consumed by
//! dedicated handlers such as the realtime event bridge.

pub mod alert;
pub mod crime;
pub mod publisher;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use alert::AlertEvent;
pub use crime::CrimeEvent;
pub use publisher::EventPublisher;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A crime-report event.
    Crime(CrimeEvent),
    /// An alert lifecycle event.
    Alert(AlertEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
