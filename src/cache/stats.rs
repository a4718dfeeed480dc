//! Cache Statistics Module
//!
//! Read-only aggregate reported by the backing store.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
/// Point-in-time aggregate over the persisted cache rows.
///
/// Computed server-side by the store on request; informational and
/// monitoring use only, never consulted by a correctness-critical path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of rows currently persisted, live or not
    pub total_entries: u64,
    /// Rows whose expiration has passed but which no read has swept yet
    pub expired_entries: u64,
    /// Approximate storage footprint in bytes
    pub memory_usage: u64,
}

impl CacheStats {
    // == Live Entries ==
    /// Rows still retrievable, i.e. persisted and unexpired.
    pub fn live_entries(&self) -> u64 {
        self.total_entries.saturating_sub(self.expired_entries)
    }
}
