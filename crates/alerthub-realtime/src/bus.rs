//! Publish-only broadcast bus.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use alerthub_core::config::RealtimeConfig;

use crate::channel::GroupRegistry;
use crate::connection::{ConnectionHandle, ConnectionId, ConnectionPool};
use crate::message::BroadcastMessage;

/// Delivers topic messages to the connections joined at publish time.
///
/// There is no history: a connection that joins after a publish never
/// sees that message.
#[derive(Debug)]
pub struct BroadcastBus {
    connections: ConnectionPool,
    groups: GroupRegistry,
    buffer_size: usize,
}

impl BroadcastBus {
    /// Create a bus.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            connections: ConnectionPool::new(),
            groups: GroupRegistry::new(),
            buffer_size: config.channel_buffer_size.max(1),
        }
    }

    /// Register a client. The receiver yields frames to write to it.
    pub fn connect(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.connections.add(handle.clone());
        debug!(conn_id = %handle.id, "Broadcast client connected");
        (handle, rx)
    }

    /// Add a connection to a topic group. Unknown connections are
    /// ignored.
    pub fn join(&self, conn_id: ConnectionId, topic: &str) -> bool {
        if self.connections.get(&conn_id).is_none() {
            return false;
        }
        self.groups.join(topic, conn_id)
    }

    /// Remove a connection from a topic group.
    pub fn leave(&self, conn_id: ConnectionId, topic: &str) -> bool {
        self.groups.leave(topic, conn_id)
    }

    /// Drop a client and all of its memberships.
    pub fn disconnect(&self, conn_id: ConnectionId) {
        let left = self.groups.leave_all(conn_id);
        if let Some(handle) = self.connections.remove(&conn_id) {
            handle.mark_dead();
        }
        debug!(conn_id = %conn_id, groups_left = left, "Broadcast client disconnected");
    }

    /// Inbound client frames are accepted and discarded.
    pub fn receive(&self, conn_id: ConnectionId, _text: &str) {
        debug!(conn_id = %conn_id, "Ignoring inbound frame");
    }

    /// Push `message` to every member of `topic`. Returns the number of
    /// connections that accepted it.
    pub fn publish(&self, topic: &str, message: &BroadcastMessage) -> usize {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(topic = %topic, error = %e, "Failed to encode broadcast message");
                return 0;
            }
        };

        let mut delivered = 0;
        for conn_id in self.groups.members(topic) {
            if let Some(handle) = self.connections.get(&conn_id) {
                if handle.send(frame.clone()) {
                    delivered += 1;
                }
            }
        }
        info!(topic = %topic, delivered, "Broadcast published");
        delivered
    }

    /// Shorthand for publishing a plain text.
    pub fn broadcast(&self, topic: &str, text: impl Into<String>) -> usize {
        self.publish(topic, &BroadcastMessage::new(text))
    }

    /// Live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.connection_count()
    }

    /// Members of a topic.
    pub fn group_size(&self, topic: &str) -> usize {
        self.groups.group_size(topic)
    }
}
