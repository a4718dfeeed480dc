//! Postgres Store
//!
//! sqlx-backed [`CacheStore`] persisting one row per key in the
//! `cache_entries` table. Upserts ride on `INSERT .. ON CONFLICT`,
//! pattern invalidation on `ILIKE`, and statistics on a single
//! server-side aggregate query.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::cache::{CacheEntry, CacheStats};
use crate::config::CacheConfig;
use crate::error::BoxError;
use crate::store::CacheStore;

// == Postgres Store ==
/// Persistent row store over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_entries: i64,
    expired_entries: i64,
    memory_usage: i64,
}

impl PostgresStore {
    // == Constructor ==
    /// Connects to the database and builds the pool.
    ///
    /// # Arguments
    /// * `database_url` - Postgres connection string
    /// * `config` - Pool sizing configuration
    pub async fn connect(database_url: &str, config: &CacheConfig) -> Result<Self, BoxError> {
        info!("Connecting to cache database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await?;
        info!("Cache database connection established");

        Ok(Self { pool })
    }

    /// Wraps an existing pool, for callers that share one across services.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    // == Schema ==
    /// Creates the `cache_entries` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key        TEXT PRIMARY KEY,
                value      JSONB NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CacheStore for PostgresStore {
    async fn fetch(&self, key: &str) -> Result<Option<CacheEntry>, BoxError> {
        let entry = sqlx::query_as::<_, CacheEntry>(
            "SELECT key, value, expires_at, created_at FROM cache_entries WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE SET
                value      = EXCLUDED.value,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.expires_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM cache_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_all(&self) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM cache_entries")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, BoxError> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM cache_entries WHERE key ILIKE $1",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn stats(&self) -> Result<CacheStats, BoxError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                count(*)                                        AS total_entries,
                count(*) FILTER (WHERE expires_at <= now())     AS expired_entries,
                pg_total_relation_size('cache_entries')         AS memory_usage
            FROM cache_entries
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CacheStats {
            total_entries: u64::try_from(row.total_entries).unwrap_or(0),
            expired_entries: u64::try_from(row.expired_entries).unwrap_or(0),
            memory_usage: u64::try_from(row.memory_usage).unwrap_or(0),
        })
    }
}
