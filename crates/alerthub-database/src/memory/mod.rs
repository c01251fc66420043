//! In-memory store using a Tokio mutex for single-node deployments.
//!
//! One [`MemoryStore`] implements every store trait over shared state,
//! so receipts can see alerts when counting unread items. Every trait
//! method takes the lock once, which makes each operation atomic.

mod alert;
mod crime;
mod preference;
mod receipt;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use alerthub_entity::alert::Alert;
use alerthub_entity::crime::CrimeReport;
use alerthub_entity::preference::NotificationPreference;
use alerthub_entity::receipt::Receipt;

/// Internal state for the memory store.
#[derive(Debug, Default)]
struct InnerState {
    alerts: HashMap<Uuid, Alert>,
    receipts: HashMap<(Uuid, Uuid), Receipt>,
    /// Ordered so recipient lists come back sorted by user ID.
    preferences: BTreeMap<Uuid, NotificationPreference>,
    crimes: Vec<CrimeReport>,
}

/// In-memory implementation of every store trait.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of receipts held.
    pub async fn receipt_count(&self) -> usize {
        self.state.lock().await.receipts.len()
    }
}
