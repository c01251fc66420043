//! Per-run delivery counters.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Aggregate outcome of one dispatcher pass.
///
/// `attempted = delivered + skipped + failed` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTally {
    /// Recipients considered.
    pub attempted: u64,
    /// Accepted by the provider (or handed to the queue, for SMS).
    pub delivered: u64,
    /// Already delivered on this channel by an earlier run.
    pub skipped: u64,
    /// Provider, queue or store failures.
    pub failed: u64,
}

impl DeliveryTally {
    pub(crate) fn record_delivered(&mut self) {
        self.attempted += 1;
        self.delivered += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.attempted += 1;
        self.skipped += 1;
    }

    pub(crate) fn record_failed(&mut self) {
        self.attempted += 1;
        self.failed += 1;
    }
}

impl AddAssign for DeliveryTally {
    fn add_assign(&mut self, rhs: Self) {
        self.attempted += rhs.attempted;
        self.delivered += rhs.delivered;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}
