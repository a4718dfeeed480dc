//! Stratix Cache - a TTL key/value cache over a persistent row store
//!
//! Memoizes expensive downstream calls (model completions, analytics
//! aggregates) behind a uniform get/set/invalidate protocol with
//! per-entry expiration and lazy eviction.
//!
//! # Example
//!
//! ```no_run
//! use stratix_cache::{CacheConfig, CacheService, MemoryStore};
//!
//! # async fn run() -> stratix_cache::Result<()> {
//! let config = CacheConfig::from_env();
//! let cache = CacheService::from_config(MemoryStore::new(), &config);
//!
//! cache.set("brand:123:dna", &"analyzed", None).await?;
//! let hit: Option<String> = cache.get("brand:123:dna").await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod store;

pub use cache::{CacheEntry, CacheService, CacheStats};
pub use config::CacheConfig;
pub use error::{BoxError, CacheError, Result};
pub use store::{CacheStore, MemoryStore, PostgresStore};
