use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::Row;
use tracing::{debug, warn};

use crate::error::Result;

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Durable key→(JSON value, updated_at) store over SQLite.
///
/// The store itself is TTL-agnostic: `set` is an unconditional upsert and the
/// freshness window is supplied by each reader, so different consumers can
/// apply different TTLs to the same row (spread history is read with a 10×
/// longer window than depth snapshots). Stale rows are never deleted, only
/// ignored at read time.
#[derive(Clone)]
pub struct CacheStore {
    pool: sqlx::SqlitePool,
}

impl CacheStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the cache table if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Read a value no older than `ttl_secs`. Missing key, expired row,
    /// undecodable value, and storage errors all resolve to `None` — callers
    /// treat every miss identically to "never cached".
    pub async fn get<T: DeserializeOwned>(&self, key: &str, ttl_secs: u64) -> Option<T> {
        self.get_at(key, ttl_secs, now_ms()).await
    }

    pub async fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl_secs: u64,
        now_ms: i64,
    ) -> Option<T> {
        let row = match sqlx::query("SELECT value, updated_at FROM cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => row?,
            Err(e) => {
                warn!("cache read failed for {key}: {e}");
                return None;
            }
        };

        let updated_at: i64 = row.try_get("updated_at").ok()?;
        let age_ms = now_ms.saturating_sub(updated_at);
        if age_ms > (ttl_secs as i64) * 1_000 {
            return None;
        }

        let raw: String = row.try_get("value").ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("cache decode failed for {key}: {e}");
                None
            }
        }
    }

    /// Upsert value and timestamp for `key`. The write is the sole source of
    /// "previous state" for the delta analyzers, so failures propagate.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_at(key, value, now_ms()).await
    }

    pub async fn set_at<T: Serialize>(&self, key: &str, value: &T, now_ms: i64) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO cache (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(raw)
        .bind(now_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
