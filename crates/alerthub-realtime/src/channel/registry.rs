//! Group registry: every topic group and membership.

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::group::Group;
use super::subscription::SubscriptionTracker;

/// Registry of all active topic groups.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    /// Topic → group.
    groups: DashMap<String, Group>,
    /// Reverse index.
    subscriptions: SubscriptionTracker,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a topic group.
    pub fn join(&self, topic: &str, conn_id: ConnectionId) -> bool {
        let added = self
            .groups
            .entry(topic.to_string())
            .or_insert_with(|| Group::new(topic.to_string()))
            .join(conn_id);
        self.subscriptions.add(conn_id, topic.to_string());
        added
    }

    /// Removes a connection from a topic group.
    pub fn leave(&self, topic: &str, conn_id: ConnectionId) -> bool {
        let mut removed = false;
        if let Some(mut group) = self.groups.get_mut(topic) {
            removed = group.leave(conn_id);
            if group.is_empty() {
                drop(group);
                self.groups.remove(topic);
            }
        }
        self.subscriptions.remove(conn_id, topic);
        removed
    }

    /// Removes a connection from every group it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) -> usize {
        let topics = self.subscriptions.remove_all(conn_id);
        for topic in &topics {
            if let Some(mut group) = self.groups.get_mut(topic) {
                group.leave(conn_id);
                if group.is_empty() {
                    drop(group);
                    self.groups.remove(topic);
                }
            }
        }
        topics.len()
    }

    /// Members of a topic group.
    pub fn members(&self, topic: &str) -> Vec<ConnectionId> {
        self.groups
            .get(topic)
            .map(|group| group.members())
            .unwrap_or_default()
    }

    /// Number of topics a connection has joined.
    pub fn membership_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Member count of a topic group.
    pub fn group_size(&self, topic: &str) -> usize {
        self.groups.get(topic).map(|g| g.len()).unwrap_or(0)
    }

    /// Number of non-empty groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
