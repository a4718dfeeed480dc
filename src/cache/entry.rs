//! Cache Entry Module
//!
//! Defines the persisted row shape for individual cache entries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single persisted cache row.
///
/// One live row exists per key; writes replace the whole row, including
/// its expiration. The value is opaque JSON and is never interpreted or
/// mutated by the cache.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CacheEntry {
    /// Unique key, caller-defined namespace convention (e.g. `"brand:123:dna"`)
    pub key: String,
    /// The stored payload, opaque to the cache
    pub value: Value,
    /// Absolute expiration timestamp; the entry is logically absent once
    /// the current time reaches it
    pub expires_at: DateTime<Utc>,
    /// Timestamp of the last write (informational only)
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` from now.
    ///
    /// # Arguments
    /// * `key` - The key to store the value under
    /// * `value` - The payload to store
    /// * `ttl_seconds` - TTL in seconds (must be > 0; caller responsibility)
    pub fn new(key: impl Into<String>, value: Value, ttl_seconds: u64) -> Self {
        let now = Utc::now();

        Self {
            key: key.into(),
            value,
            expires_at: now + Duration::seconds(ttl_seconds as i64),
            created_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `expires_at`.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in seconds, saturating at zero once expired.
    ///
    /// Useful for debugging and monitoring.
    pub fn ttl_remaining(&self) -> u64 {
        let remaining = (self.expires_at - Utc::now()).num_seconds();
        remaining.max(0) as u64
    }
}
