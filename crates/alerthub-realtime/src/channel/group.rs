//! Single topic group with member tracking.

use std::collections::HashSet;

use crate::connection::handle::ConnectionId;

/// Connections currently joined to one topic.
#[derive(Debug, Clone)]
pub struct Group {
    /// Topic name.
    pub topic: String,
    members: HashSet<ConnectionId>,
}

impl Group {
    /// Creates a new empty group.
    pub fn new(topic: String) -> Self {
        Self {
            topic,
            members: HashSet::new(),
        }
    }

    /// Adds a member. Returns `false` if already joined.
    pub fn join(&mut self, conn_id: ConnectionId) -> bool {
        self.members.insert(conn_id)
    }

    /// Removes a member.
    pub fn leave(&mut self, conn_id: ConnectionId) -> bool {
        self.members.remove(&conn_id)
    }

    /// Returns member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the group has any members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns all member connection IDs.
    pub fn members(&self) -> Vec<ConnectionId> {
        self.members.iter().copied().collect()
    }
}
