//! SqliteStore
//! -----------
//! SQLite-backed implementation of [`KvStore`]. One row per key, the value is
//! the JSON text of the whole record. Writes are upserts, so `set` keeps the
//! same whole-value replace semantics as the in-memory store:
//!
//!  - records survive restarts of the CLI
//!  - a missing row reads as `None`
//!  - `delete` removes the row outright
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use async_trait::async_trait;
use common::warn_if_slow;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use crate::{KvStore, StoreKey};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. The schema must already exist (see [`SqliteStore::migrate`]).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed) and ensure the schema exists.
    ///
    /// `sqlite::memory:` is accepted; the pool is then pinned to a single
    /// connection so every query sees the same database.
    pub async fn open(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url '{url}'"))?
            .create_if_missing(true);

        let max_connections = if url.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open sqlite store at '{url}'"))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[async_trait]
impl KvStore for SqliteStore {
    #[instrument(skip(self), target = "store", fields(key = %key))]
    async fn get(&self, key: StoreKey) -> anyhow::Result<Option<Value>> {
        let row = warn_if_slow("sqlite_get", Duration::from_millis(100), async {
            sqlx::query("SELECT value FROM kv WHERE key = ?")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await
        })
        .await
        .context("sqlite read failed")?;

        let Some(row) = row else {
            debug!("no record stored");
            return Ok(None);
        };

        let text: String = row.get("value");
        let value = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("Invalid JSON stored under '{}': {}", key, e))?;

        Ok(Some(value))
    }

    #[instrument(skip(self, value), target = "store", fields(key = %key))]
    async fn set(&self, key: StoreKey, value: Value) -> anyhow::Result<()> {
        let text = serde_json::to_string(&value)?;

        warn_if_slow("sqlite_set", Duration::from_millis(100), async {
            sqlx::query(
                r#"
                INSERT INTO kv (key, value, updated_at_ms)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at_ms = excluded.updated_at_ms;
            "#,
            )
            .bind(key.as_str())
            .bind(text)
            .bind(now_ms())
            .execute(&self.pool)
            .await
        })
        .await
        .context("sqlite write failed")?;

        debug!("record replaced");
        Ok(())
    }

    #[instrument(skip(self), target = "store", fields(key = %key))]
    async fn delete(&self, key: StoreKey) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .context("sqlite delete failed")?;

        Ok(())
    }
}
