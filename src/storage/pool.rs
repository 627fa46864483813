//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled so the review server can read while a batch writes
//! - Automatic database file creation

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, error};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

/// Shared SQLite pool type.
pub type DbPool = Pool<Sqlite>;

/// Opens (creating if needed) the SQLite database at `db_path`.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<DbPool, DatabaseError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => debug!("Created database file {db_path_str}"),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Using existing database file {db_path_str}")
        }
        Err(e) => {
            error!("Failed to create database file {db_path_str}: {e}");
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(pool)
}

/// Quotes an SQL identifier (table or column name) supplied on the command line.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("geocoded"), "\"geocoded\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn test_pool_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.db");
        assert!(!path.exists());
        let pool = init_db_pool_with_path(&path).await.unwrap();
        assert!(path.exists());
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_pool_fails_for_unwritable_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing_dir").join("cache.db");
        let result = init_db_pool_with_path(&path).await;
        assert!(matches!(result, Err(DatabaseError::FileCreationError(_))));
    }
}
