//! Fire-and-forget publisher for domain events.

use tokio::sync::mpsc;
use tracing::warn;

use super::DomainEvent;

/// Cloneable handle used by write paths to emit domain events.
///
/// Publishing never blocks: when the consumer lags and the buffer is
/// full, the event is dropped and a warning is logged.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: mpsc::Sender<DomainEvent>,
}

impl EventPublisher {
    /// Create a publisher and the receiving end for its consumer.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<DomainEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }

    /// Publish an event. Returns whether it was accepted.
    pub fn publish(&self, event: DomainEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(event_id = %event.id, "Event buffer full, dropping domain event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(event_id = %event.id, "Event consumer gone, dropping domain event");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AlertEvent, EventPayload};
    use uuid::Uuid;

    fn viewed() -> DomainEvent {
        DomainEvent::new(
            None,
            EventPayload::Alert(AlertEvent::Viewed {
                alert_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            }),
        )
    }

    #[tokio::test]
    async fn test_publish_delivers_to_receiver() {
        let (publisher, mut rx) = EventPublisher::channel(4);
        assert!(publisher.publish(viewed()));
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_full_buffer_drops_instead_of_blocking() {
        let (publisher, _rx) = EventPublisher::channel(1);
        assert!(publisher.publish(viewed()));
        assert!(!publisher.publish(viewed()));
    }

    #[tokio::test]
    async fn test_closed_consumer_is_reported() {
        let (publisher, rx) = EventPublisher::channel(1);
        drop(rx);
        assert!(!publisher.publish(viewed()));
    }
}
