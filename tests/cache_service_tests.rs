//! Integration Tests for the Cache Service
//!
//! Exercises the full public protocol against an injected in-memory
//! store, including expiration, invalidation, and the compute-on-miss
//! wrapper.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stratix_cache::{BoxError, CacheService, CacheStore, MemoryStore};

// == Helper Functions ==

const TEST_DEFAULT_TTL: u64 = 300;

fn create_test_cache() -> (CacheService<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    (CacheService::new(store.clone(), TEST_DEFAULT_TTL), store)
}

/// Rewrites a persisted row's expiration to `seconds` in the past,
/// standing in for mocking the clock forward.
async fn expire_row(store: &MemoryStore, key: &str, seconds: i64) {
    let mut entry = store.fetch(key).await.unwrap().expect("row should exist");
    entry.expires_at = chrono::Utc::now() - Duration::seconds(seconds);
    store.upsert(entry).await.unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
}

// == Get / Set ==

#[tokio::test]
async fn test_set_then_get_round_trips_structs() {
    let (cache, _) = create_test_cache();
    let profile = Profile {
        name: "Ada".to_string(),
    };

    cache.set("user:42:profile", &profile, Some(60)).await.unwrap();

    let hit: Option<Profile> = cache.get("user:42:profile").await.unwrap();
    assert_eq!(hit, Some(profile));
}

#[tokio::test]
async fn test_get_absent_key_is_none_not_error() {
    let (cache, _) = create_test_cache();

    let miss: Option<Profile> = cache.get("user:0:profile").await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_expired_entry_is_absent_and_row_removed() {
    let (cache, store) = create_test_cache();

    cache
        .set("user:42:profile", &Profile { name: "Ada".to_string() }, Some(60))
        .await
        .unwrap();

    // Push the expiration 61 seconds into the past
    expire_row(&store, "user:42:profile", 61).await;

    let miss: Option<Profile> = cache.get("user:42:profile").await.unwrap();
    assert!(miss.is_none());

    // The discovering read deleted the row as well
    assert!(store.fetch("user:42:profile").await.unwrap().is_none());
}

#[tokio::test]
async fn test_ttl_expiry_with_real_clock() {
    let (cache, _) = create_test_cache();

    cache.set("short-lived", &"v", Some(1)).await.unwrap();
    let before: Option<String> = cache.get("short-lived").await.unwrap();
    assert_eq!(before.as_deref(), Some("v"));

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let after: Option<String> = cache.get("short-lived").await.unwrap();
    assert!(after.is_none());
}

#[tokio::test]
async fn test_overwrite_replaces_value_and_expiry() {
    let (cache, store) = create_test_cache();

    cache.set("k", &"v1", Some(100)).await.unwrap();
    cache.set("k", &"v2", Some(5)).await.unwrap();

    let value: Option<String> = cache.get("k").await.unwrap();
    assert_eq!(value.as_deref(), Some("v2"));

    // Entry now expires per the second TTL, not the first
    let entry = store.fetch("k").await.unwrap().unwrap();
    assert!(entry.ttl_remaining() <= 5);
}

// == Delete / Clear / Invalidate ==

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (cache, store) = create_test_cache();

    cache.set("k", &1, None).await.unwrap();
    cache.delete("k").await.unwrap();
    cache.delete("k").await.unwrap();
    cache.delete("never-existed").await.unwrap();

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let (cache, _) = create_test_cache();

    cache.set("a:1", &1, None).await.unwrap();
    cache.set("b:1", &2, None).await.unwrap();

    cache.clear().await.unwrap();

    assert!(cache.get::<i64>("a:1").await.unwrap().is_none());
    assert!(cache.get::<i64>("b:1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalidate_pattern_spares_other_namespaces() {
    let (cache, _) = create_test_cache();

    cache.set("a:1", &1, None).await.unwrap();
    cache.set("a:2", &2, None).await.unwrap();
    cache.set("b:1", &3, None).await.unwrap();

    cache.invalidate_pattern("a:%").await.unwrap();

    assert!(cache.get::<i64>("a:1").await.unwrap().is_none());
    assert!(cache.get::<i64>("a:2").await.unwrap().is_none());
    assert_eq!(cache.get::<i64>("b:1").await.unwrap(), Some(3));
}

#[tokio::test]
async fn test_invalidate_pattern_is_case_insensitive() {
    let (cache, _) = create_test_cache();

    cache.set("Brand:123:dna", &1, None).await.unwrap();
    cache.set("brand:123:tone", &2, None).await.unwrap();

    cache.invalidate_pattern("BRAND:123:%").await.unwrap();

    assert!(cache.get::<i64>("Brand:123:dna").await.unwrap().is_none());
    assert!(cache.get::<i64>("brand:123:tone").await.unwrap().is_none());
}

// == Get Or Set ==

#[tokio::test]
async fn test_get_or_set_miss_invokes_producer_once() {
    let (cache, store) = create_test_cache();
    let calls = AtomicUsize::new(0);

    let value: i64 = cache
        .get_or_set(
            "analytics:daily",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(41 + 1)
            },
            Some(600),
        )
        .await
        .unwrap();

    assert_eq!(value, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The computed value was persisted with the requested TTL
    let entry = store.fetch("analytics:daily").await.unwrap().unwrap();
    assert_eq!(entry.value, json!(42));
    assert!(entry.ttl_remaining() > 595);
}

#[tokio::test]
async fn test_get_or_set_hit_returns_cached_value() {
    let (cache, _) = create_test_cache();
    let calls = AtomicUsize::new(0);

    cache.set("k", &"stored", None).await.unwrap();

    let value: String = cache
        .get_or_set(
            "k",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>("recomputed".to_string())
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(value, "stored");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_or_set_recomputes_after_expiry() {
    let (cache, store) = create_test_cache();

    cache.set("k", &"old", Some(60)).await.unwrap();
    expire_row(&store, "k", 1).await;

    let value: String = cache
        .get_or_set("k", || async { Ok::<_, BoxError>("fresh".to_string()) }, None)
        .await
        .unwrap();

    assert_eq!(value, "fresh");
}

#[tokio::test]
async fn test_get_or_set_producer_error_is_wrapped() {
    let (cache, store) = create_test_cache();

    let result: stratix_cache::Result<String> = cache
        .get_or_set(
            "k",
            || async { Err(anyhow::anyhow!("model endpoint unavailable").into()) },
            None,
        )
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.operation(), "get_or_set");
    assert_eq!(err.key(), Some("k"));
    assert!(err.to_string().contains("model endpoint unavailable"));

    // Nothing was stored for the failed computation
    assert!(store.fetch("k").await.unwrap().is_none());
}

// == Stats ==

#[tokio::test]
async fn test_stats_reflect_persisted_and_expired_rows() {
    let (cache, store) = create_test_cache();

    cache.set("live:1", &1, None).await.unwrap();
    cache.set("live:2", &2, None).await.unwrap();
    cache.set("stale:1", &3, Some(60)).await.unwrap();
    expire_row(&store, "stale:1", 1).await;

    let stats = cache.get_stats().await.unwrap();
    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.expired_entries, 1);
    assert_eq!(stats.live_entries(), 2);
    assert!(stats.memory_usage > 0);
}
