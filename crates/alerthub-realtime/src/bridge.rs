//! Domain event → broadcast mapping.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use alerthub_core::events::{DomainEvent, EventPayload};

use crate::bus::BroadcastBus;
use crate::message::BroadcastMessage;

/// Consumes domain events and publishes the ones dashboards care about.
#[derive(Debug, Clone)]
pub struct EventBridge {
    bus: Arc<BroadcastBus>,
    crime_topic: String,
}

impl EventBridge {
    /// Create a bridge publishing crime events to `crime_topic`.
    pub fn new(bus: Arc<BroadcastBus>, crime_topic: impl Into<String>) -> Self {
        Self {
            bus,
            crime_topic: crime_topic.into(),
        }
    }

    /// Route one event. Returns how many clients received something.
    pub fn handle(&self, event: &DomainEvent) -> usize {
        match &event.payload {
            EventPayload::Crime(crime) => self
                .bus
                .publish(&self.crime_topic, &BroadcastMessage::new(crime.message())),
            EventPayload::Alert(alert) => {
                debug!(event_id = %event.id, ?alert, "Alert event not broadcast");
                0
            }
        }
    }

    /// Drain `events` until every publisher is dropped.
    pub fn spawn(self, mut events: mpsc::Receiver<DomainEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle(&event);
            }
            info!("Event bridge stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerthub_core::config::RealtimeConfig;
    use alerthub_core::events::{AlertEvent, CrimeEvent, EventPublisher};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_crime_event_reaches_topic() {
        let bus = Arc::new(BroadcastBus::new(&RealtimeConfig::default()));
        let (conn, mut rx) = bus.connect();
        bus.join(conn.id, "crime_alerts");

        let (publisher, events) = EventPublisher::channel(8);
        let task = EventBridge::new(bus.clone(), "crime_alerts").spawn(events);

        publisher.publish(DomainEvent::new(
            None,
            EventPayload::Alert(AlertEvent::Viewed {
                alert_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            }),
        ));
        publisher.publish(DomainEvent::new(
            None,
            EventPayload::Crime(CrimeEvent::Reported {
                report_id: Uuid::new_v4(),
                title: "Car theft".to_string(),
                location: "Park Ave".to_string(),
                occurred_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
            }),
        ));
        drop(publisher);
        task.await.unwrap();

        let frame = rx.recv().await.unwrap();
        let message: BroadcastMessage = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            message.message,
            "New Crime Alert: Car theft at Park Ave on 2024-06-01 08:30"
        );
        assert!(rx.try_recv().is_err());
    }
}
