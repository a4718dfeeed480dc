//! Cache Service Module
//!
//! TTL-aware key/value protocol over an injected persistent store,
//! shielding callers from expiration bookkeeping and from hand-rolling
//! their own "check staleness, else recompute" logic.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats};
use crate::config::CacheConfig;
use crate::error::{BoxError, CacheError, Result};
use crate::store::CacheStore;

// == Cache Service ==
/// Namespaced key/value cache with per-entry expiration.
///
/// The service itself is stateless: every method is an independent
/// async call against the injected store, and all expiration handling
/// is lazy. An expired row is removed by the read that discovers it;
/// there is no background sweeper.
///
/// Construct one instance with the store and configuration and pass it
/// to consumers explicitly; there is no global accessor.
#[derive(Debug, Clone)]
pub struct CacheService<S> {
    store: S,
    default_ttl: u64,
}

impl<S: CacheStore> CacheService<S> {
    // == Constructor ==
    /// Creates a service over `store` with the given default TTL in seconds.
    pub fn new(store: S, default_ttl: u64) -> Self {
        Self { store, default_ttl }
    }

    /// Creates a service over `store` configured from a [`CacheConfig`].
    pub fn from_config(store: S, config: &CacheConfig) -> Self {
        Self::new(store, config.default_ttl)
    }

    /// The TTL in seconds applied when a call supplies no override.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Get ==
    /// Retrieves the value stored under `key`, or `None` when no live
    /// entry exists. Absence is a normal result, never an error.
    ///
    /// An expired row found by this read is deleted before reporting
    /// absence (lazy eviction).
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let row = self
            .store
            .fetch(key)
            .await
            .map_err(|e| CacheError::new("get", Some(key), e))?;

        let entry = match row {
            Some(entry) => entry,
            None => {
                debug!(key, "cache miss");
                return Ok(None);
            }
        };

        if entry.is_expired() {
            self.store
                .remove(key)
                .await
                .map_err(|e| CacheError::new("get", Some(key), e))?;
            debug!(key, "cache entry expired");
            return Ok(None);
        }

        let value = serde_json::from_value(entry.value)
            .map_err(|e| CacheError::new("get", Some(key), e))?;
        debug!(key, "cache hit");
        Ok(Some(value))
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl_seconds` from now
    /// (default TTL when `None`).
    ///
    /// Any prior entry for the key is completely overwritten, including
    /// its expiration; there is no extend or merge. The TTL must be
    /// greater than zero; the service does not special-case other values.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> Result<()> {
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let payload =
            serde_json::to_value(value).map_err(|e| CacheError::new("set", Some(key), e))?;

        self.store
            .upsert(CacheEntry::new(key, payload, ttl))
            .await
            .map_err(|e| CacheError::new("set", Some(key), e))?;

        debug!(key, ttl, "cache entry stored");
        Ok(())
    }

    // == Delete ==
    /// Removes the entry for `key` if present. Deleting an absent key
    /// is a no-op, not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store
            .remove(key)
            .await
            .map_err(|e| CacheError::new("delete", Some(key), e))?;

        debug!(key, "cache entry deleted");
        Ok(())
    }

    // == Clear ==
    /// Removes all entries unconditionally. Intended for maintenance
    /// and tests. If the bulk delete fails partway the error propagates
    /// and the remaining state is whatever the store left behind.
    pub async fn clear(&self) -> Result<()> {
        self.store
            .remove_all()
            .await
            .map_err(|e| CacheError::new("clear", None, e))?;

        info!("cache cleared");
        Ok(())
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key matches a case-insensitive SQL
    /// LIKE pattern (`%` / `_` wildcards), e.g. `"brand:123:%"`.
    ///
    /// Matching keys are deleted one at a time; this is not atomic, and
    /// a failure partway leaves the remainder in place.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<()> {
        let keys = self
            .store
            .keys_matching(pattern)
            .await
            .map_err(|e| CacheError::new("invalidate_pattern", None, e))?;

        let count = keys.len();
        for key in keys {
            self.store
                .remove(&key)
                .await
                .map_err(|e| CacheError::new("invalidate_pattern", Some(&key), e))?;
        }

        info!(pattern, count, "cache entries invalidated");
        Ok(())
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, computing and storing it on
    /// a miss. On a hit `producer` is never invoked; on a miss it runs
    /// once and its result is stored with the given TTL, then returned.
    ///
    /// Concurrent misses on the same key are not deduplicated: each
    /// caller independently invokes its producer and performs its own
    /// write, last write wins.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_seconds: Option<u64>,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, BoxError>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(value);
        }

        let value = producer()
            .await
            .map_err(|e| CacheError::new("get_or_set", Some(key), e))?;
        self.set(key, &value, ttl_seconds).await?;
        Ok(value)
    }

    // == Stats ==
    /// Returns the store-computed aggregate over all persisted rows.
    /// Informational only; no correctness-critical path consults it.
    pub async fn get_stats(&self) -> Result<CacheStats> {
        self.store
            .stats()
            .await
            .map_err(|e| CacheError::new("get_stats", None, e))
    }
}
