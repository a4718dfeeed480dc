//! In-Memory Store
//!
//! HashMap-backed [`CacheStore`] used as an isolated double in tests and
//! for single-process deployments that can afford to lose the cache on
//! restart. Pattern matching mirrors SQL `ILIKE` semantics so tests
//! exercise the same patterns production sends to Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheStats};
use crate::error::BoxError;
use crate::store::CacheStore;

// == Memory Store ==
/// Thread-safe in-memory row store.
///
/// Clones share the same underlying map, so a test can keep a handle to
/// the store it injected into a service and inspect rows directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current number of persisted rows, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if no rows are persisted.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn fetch(&self, key: &str) -> Result<Option<CacheEntry>, BoxError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), BoxError> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BoxError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_all(&self) -> Result<(), BoxError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, BoxError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|key| like_match(pattern, key))
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<CacheStats, BoxError> {
        let entries = self.entries.read().await;
        let expired = entries.values().filter(|e| e.is_expired()).count() as u64;
        // Footprint approximated as the serialized size of the payloads
        let memory_usage: u64 = entries
            .values()
            .map(|e| e.value.to_string().len() as u64)
            .sum();

        Ok(CacheStats {
            total_entries: entries.len() as u64,
            expired_entries: expired,
            memory_usage,
        })
    }
}

// == Pattern Matching ==
/// Case-insensitive SQL LIKE matcher: `%` matches any sequence of
/// characters, `_` exactly one.
///
/// Two-pointer scan with backtracking on the last `%`; linear in
/// practice for cache-key-shaped inputs.
fn like_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '_' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '%' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(star_pos) = star {
            // Let the last % absorb one more character and retry
            pi = star_pos + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    // Only trailing wildcards may remain unconsumed
    while pi < pattern.len() && pattern[pi] == '%' {
        pi += 1;
    }
    pi == pattern.len()
}
