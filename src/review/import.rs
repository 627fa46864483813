//! Loading a batch output CSV into SQLite for review.

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use crate::storage::{quote_ident, DbPool};

/// Creates `table` with one TEXT column per CSV header and loads every row.
///
/// Rows are inserted in a single transaction; short rows are padded with
/// empty strings. Fails if `table` already exists, so a batch output is
/// never loaded twice.
pub async fn import_csv(pool: &DbPool, csv_path: &Path, table: &str) -> Result<usize> {
    let exists: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(pool)
            .await
            .context("Failed to look up existing tables")?;
    if exists.is_some() {
        bail!("Table '{table}' already exists; import into a new table name");
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        bail!("{} has no header row", csv_path.display());
    }

    let columns: Vec<String> = headers.iter().map(quote_ident).collect();
    let create = format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        columns
            .iter()
            .map(|c| format!("{c} TEXT"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        vec!["?"; columns.len()].join(", ")
    );

    let mut tx = pool.begin().await?;
    sqlx::query(&create)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to create table '{table}'"))?;

    let mut rows = 0usize;
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read row {}", rows + 1))?;
        let mut query = sqlx::query(&insert);
        for i in 0..headers.len() {
            query = query.bind(record.get(i).unwrap_or("").to_string());
        }
        query.execute(&mut *tx).await?;
        rows += 1;
    }
    tx.commit().await?;

    info!("Imported {rows} rows from {} into '{table}'", csv_path.display());
    Ok(rows)
}
