//! Store Module
//!
//! Persistence boundary for cache rows. The service is written against
//! the [`CacheStore`] trait so callers inject the backend explicitly:
//! [`PostgresStore`] in production, [`MemoryStore`] in tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::cache::{CacheEntry, CacheStats};
use crate::error::BoxError;

// == Cache Store Trait ==
/// Row-oriented persistence backend for cache entries.
///
/// Implementations hold one row per key and must make `upsert` an atomic
/// insert-or-replace on that key. The store is the source of truth; no
/// in-process memory layer is assumed on top of it.
///
/// Expiration is not the store's concern: `fetch` returns whatever row
/// is persisted, expired or not, and the service decides what to do
/// with it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetches the row for `key`, or None if no row exists.
    async fn fetch(&self, key: &str) -> Result<Option<CacheEntry>, BoxError>;

    /// Inserts the row, replacing any existing row with the same key.
    async fn upsert(&self, entry: CacheEntry) -> Result<(), BoxError>;

    /// Removes the row for `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), BoxError>;

    /// Removes every row unconditionally.
    async fn remove_all(&self) -> Result<(), BoxError>;

    /// Lists keys matching a case-insensitive SQL LIKE pattern
    /// (`%` matches any sequence, `_` any single character).
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, BoxError>;

    /// Computes the aggregate statistics over all persisted rows.
    async fn stats(&self) -> Result<CacheStats, BoxError>;
}
