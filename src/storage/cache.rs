//! Persistent cache of raw geocoding responses.
//!
//! Entries live in an append-only `reqres` table keyed by the canonical request
//! string. Rows are never updated or deleted; a lookup returns the earliest row
//! inserted for a key.

use std::path::Path;

use log::{debug, info};

use super::pool::{init_db_pool_with_path, DbPool};
use crate::error_handling::DatabaseError;

/// Response cache backed by SQLite, or a no-op cache when no file is configured.
pub struct ResponseCache {
    pool: Option<DbPool>,
}

impl ResponseCache {
    /// A cache that never hits and discards every `put`.
    pub fn disabled() -> Self {
        ResponseCache { pool: None }
    }

    /// Opens (creating if needed) the cache file at `path`.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(path).await?;
        let cache = Self::with_pool(pool).await?;
        info!("Using response cache {}", path.display());
        Ok(cache)
    }

    /// Wraps an existing pool, creating the cache table if it is missing.
    pub async fn with_pool(pool: DbPool) -> Result<Self, DatabaseError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reqres (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                request TEXT,
                response TEXT
            )",
        )
        .execute(&pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reqres_request ON reqres (request)")
            .execute(&pool)
            .await?;
        Ok(ResponseCache { pool: Some(pool) })
    }

    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Returns the first response stored for `request`, if any.
    pub async fn get(&self, request: &str) -> Result<Option<String>, DatabaseError> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };
        let response: Option<String> =
            sqlx::query_scalar("SELECT response FROM reqres WHERE request = ? ORDER BY id LIMIT 1")
                .bind(request)
                .fetch_optional(pool)
                .await?;
        Ok(response)
    }

    /// Appends a `(request, response)` entry.
    pub async fn put(&self, request: &str, response: &str) -> Result<(), DatabaseError> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        sqlx::query("INSERT INTO reqres (request, response) VALUES (?, ?)")
            .bind(request)
            .bind(response)
            .execute(pool)
            .await?;
        debug!("Cached response for {request}");
        Ok(())
    }

    /// Number of stored entries (0 for a disabled cache).
    pub async fn len(&self) -> Result<i64, DatabaseError> {
        let Some(pool) = &self.pool else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reqres")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Closes the underlying pool. Called on every exit path of a run.
    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
        }
    }
}
