//! SQL for the review workflow.
//!
//! Table and column names come from the command line and are quoted with
//! [`quote_ident`]; values are always bound.

use log::{debug, warn};
use sqlx::Row;

use super::types::{ApprovedPoint, Candidate, ReviewTables};
use crate::config::{
    COL_FIELD_USED, COL_LATITUDE, COL_LOCALITY_ID, COL_LONGITUDE, COL_PARSE_PATTERN,
    COL_PRECISION, COL_RESULT_ID, COL_SCORE, COL_UNCERTAINTY_RADIUS,
};
use crate::error_handling::DatabaseError;
use crate::storage::{quote_ident, DbPool};

/// Creates the approved-points table if it does not exist.
pub async fn create_output_table(pool: &DbPool, output_table: &str) -> Result<(), DatabaseError> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            latitude TEXT,
            longitude TEXT,
            uncertaintyRadiusMeters TEXT,
            uncertaintyPolygon TEXT,
            geolocate_LocalityID,
            geolocate_ResultID
        )",
        quote_ident(output_table)
    );
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

/// Picks a random top-ranked result whose locality has not been approved yet.
pub async fn fetch_candidate(
    pool: &DbPool,
    tables: &ReviewTables,
) -> Result<Option<Candidate>, DatabaseError> {
    let text = |column: &str| format!("CAST(t1.{} AS TEXT)", quote_ident(column));
    let mut columns: Vec<String> = tables
        .locality_columns
        .iter()
        .map(|c| text(c.as_str()))
        .collect();
    columns.extend(
        [
            COL_FIELD_USED,
            tables.country_column.as_str(),
            tables.state_column.as_str(),
            tables.county_column.as_str(),
            COL_LATITUDE,
            COL_LONGITUDE,
            COL_PARSE_PATTERN,
            COL_PRECISION,
            COL_SCORE,
            COL_UNCERTAINTY_RADIUS,
            COL_LOCALITY_ID,
            COL_RESULT_ID,
        ]
        .into_iter()
        .map(|c| text(c)),
    );

    let sql = format!(
        "SELECT {columns} FROM {input} t1 \
         LEFT JOIN {output} t2 ON t1.{lid} = t2.{lid} \
         WHERE t2.id IS NULL AND t1.{rid} = '1' \
         ORDER BY RANDOM() LIMIT 1",
        columns = columns.join(", "),
        input = quote_ident(&tables.input_table),
        output = quote_ident(&tables.output_table),
        lid = quote_ident(COL_LOCALITY_ID),
        rid = quote_ident(COL_RESULT_ID),
    );
    debug!("{sql}");

    let Some(row) = sqlx::query(&sql).fetch_optional(pool).await? else {
        return Ok(None);
    };
    let value = |index: usize| -> Result<String, DatabaseError> {
        Ok(row.try_get::<Option<String>, _>(index)?.unwrap_or_default())
    };

    let n = tables.locality_columns.len();
    let field_used = value(n)?;
    let field_index = match tables.locality_columns.iter().position(|c| *c == field_used) {
        Some(index) => index,
        None => {
            warn!("Locality field '{field_used}' is not one of the configured locality fields");
            0
        }
    };

    Ok(Some(Candidate {
        field_index,
        locality: value(field_index)?,
        country: value(n + 1)?,
        state: value(n + 2)?,
        county: value(n + 3)?,
        latitude: value(n + 4)?,
        longitude: value(n + 5)?,
        parse_pattern: value(n + 6)?,
        precision: value(n + 7)?,
        score: value(n + 8)?,
        uncertainty: value(n + 9)?,
        locality_id: value(n + 10)?,
        result_id: value(n + 11)?,
    }))
}

/// Records an approved point.
pub async fn insert_approved(
    pool: &DbPool,
    output_table: &str,
    point: &ApprovedPoint,
) -> Result<(), DatabaseError> {
    let sql = format!(
        "INSERT INTO {} (latitude, longitude, uncertaintyRadiusMeters, uncertaintyPolygon, \
         geolocate_LocalityID, geolocate_ResultID) VALUES (?, ?, ?, ?, ?, ?)",
        quote_ident(output_table)
    );
    sqlx::query(&sql)
        .bind(&point.latitude)
        .bind(&point.longitude)
        .bind(&point.uncertainty_radius)
        .bind(&point.uncertainty_polygon)
        .bind(&point.locality_id)
        .bind(&point.result_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::import::import_csv;
    use crate::storage::init_db_pool_with_path;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const BATCH_OUTPUT: &str = "\
locality,verbatimLocality,country,stateProvince,county,geolocate_LocalityID,geolocate_ResultID,geolocate_Latitude,geolocate_Longitude,geolocate_UncertaintyRadiusMeters,geolocate_UncertaintyPolygon,geolocate_Score,geolocate_Precision,geolocate_ParsePattern,geolocate_locFieldUsed,geolocate_NumResults
Lawrence,,USA,Kansas,Douglas,1,1,38.9717,-95.2353,500,,88,High,LAWRENCE,locality,2
Lawrence,,USA,Kansas,Douglas,1,2,38.9,-95.2,900,,60,Low,LAWRENCE,locality,2
,near Topeka,USA,Kansas,Shawnee,2,1,39.05,-95.68,3000,,70,Medium,TOPEKA,verbatimLocality,1
Nowhere,,USA,Kansas,,3,,,,,,,,,,0
";

    fn tables() -> ReviewTables {
        ReviewTables {
            input_table: "geocoded".into(),
            output_table: "approved".into(),
            country_column: "country".into(),
            state_column: "stateProvince".into(),
            county_column: "county".into(),
            locality_columns: vec!["locality".into(), "verbatimLocality".into()],
        }
    }

    async fn seeded_pool(dir: &TempDir) -> DbPool {
        let mut csv = NamedTempFile::new().unwrap();
        csv.write_all(BATCH_OUTPUT.as_bytes()).unwrap();
        csv.flush().unwrap();
        let pool = init_db_pool_with_path(&dir.path().join("review.db")).await.unwrap();
        import_csv(&pool, csv.path(), "geocoded").await.unwrap();
        create_output_table(&pool, "approved").await.unwrap();
        pool
    }

    fn approved(lid: &str) -> ApprovedPoint {
        ApprovedPoint {
            locality_id: lid.into(),
            result_id: "1".into(),
            latitude: "38.97".into(),
            longitude: "-95.23".into(),
            uncertainty_radius: "500".into(),
            uncertainty_polygon: String::new(),
        }
    }

    #[tokio::test]
    async fn test_candidates_until_all_reviewed() {
        let dir = TempDir::new().unwrap();
        let pool = seeded_pool(&dir).await;
        let tables = tables();

        let first = fetch_candidate(&pool, &tables).await.unwrap().unwrap();
        assert_eq!(first.result_id, "1");
        assert!(first.locality_id == "1" || first.locality_id == "2");

        insert_approved(&pool, "approved", &approved("1")).await.unwrap();
        let second = fetch_candidate(&pool, &tables).await.unwrap().unwrap();
        assert_eq!(second.locality_id, "2");
        assert_eq!(second.field_index, 1);
        assert_eq!(second.locality, "near Topeka");
        assert_eq!(second.precision, "Medium");

        insert_approved(&pool, "approved", &approved("2")).await.unwrap();
        assert_eq!(fetch_candidate(&pool, &tables).await.unwrap(), None);
        pool.close().await;
    }

    #[tokio::test]
    async fn test_create_output_table_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let pool = init_db_pool_with_path(&dir.path().join("review.db")).await.unwrap();
        create_output_table(&pool, "approved \"points\"").await.unwrap();
        create_output_table(&pool, "approved \"points\"").await.unwrap();
        insert_approved(&pool, "approved \"points\"", &approved("9")).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM \"approved \"\"points\"\"\"")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        pool.close().await;
    }
}
