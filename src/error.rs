//! Error types for the cache service
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Boxed error type surfaced by store implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error ==
/// Unified error type for all cache operations.
///
/// Every store-layer or serialization fault is wrapped into this single
/// kind, tagged with the operation that failed and the key involved
/// (where one applies). A lookup that finds nothing is not an error;
/// `get` reports it as `Ok(None)`.
///
/// Callers should treat any `CacheError` as "the cache is currently
/// unavailable" rather than as a statement about a key's presence.
#[derive(Debug, Error)]
#[error("cache {} failed{}: {}", .operation, key_context(.key), .source)]
pub struct CacheError {
    operation: &'static str,
    key: Option<String>,
    #[source]
    source: BoxError,
}

impl CacheError {
    /// Wraps an underlying failure with operation and key context.
    pub fn new(operation: &'static str, key: Option<&str>, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            key: key.map(str::to_owned),
            source: source.into(),
        }
    }

    /// The operation that failed (`"get"`, `"set"`, ...).
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The key the failed operation targeted, if it targeted one.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

fn key_context(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for key '{key}'"),
        None => String::new(),
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache service.
pub type Result<T> = std::result::Result<T, CacheError>;
