//! Review server for geocoded batch output.
//!
//! Provides three endpoints:
//! - `/geolocate` - the map page used to confirm or correct a point
//! - `/getrec` - a random top-ranked result whose locality is not yet approved
//! - `/save` - stores an approved point in the output table
//!
//! The batch output is read from a SQLite table (optionally imported from the
//! CSV at startup); approved points go to a separate table created on demand.

mod handlers;
pub mod import;
mod queries;
mod types;

use anyhow::{Context, Result};
use axum::middleware::map_response;
use axum::routing::{get, post};
use axum::Router;
use log::info;

use crate::config::ReviewConfig;
use crate::storage::init_db_pool_with_path;

use handlers::{add_cors_headers, next_record, preflight, review_page, save_point};
pub use queries::{create_output_table, fetch_candidate, insert_approved};
pub use types::{ApprovedPoint, Candidate, ReviewState, ReviewTables, SaveForm};

/// Builds the review routes over `state`.
pub fn review_router(state: ReviewState) -> Router {
    Router::new()
        .route("/geolocate", get(review_page))
        .route("/getrec", get(next_record).options(preflight))
        .route("/save", post(save_point).options(preflight))
        .layer(map_response(add_cors_headers))
        .with_state(state)
}

/// Opens the database, prepares the tables and serves until Ctrl-C.
pub async fn start_review_server(config: &ReviewConfig) -> Result<()> {
    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to open review database")?;

    if let Some(csv_path) = &config.import {
        import::import_csv(&pool, csv_path, &config.input_table)
            .await
            .with_context(|| format!("Failed to import {}", csv_path.display()))?;
    }
    create_output_table(&pool, &config.output_table)
        .await
        .context("Failed to create output table")?;

    let app = review_router(ReviewState::new(pool.clone(), ReviewTables::from(config)));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind review server to {}: {}", addr, e))?;

    info!("Review server listening on http://{}/", addr);
    info!("  - Review page: http://{}/geolocate", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutting down review server"),
                Err(e) => {
                    log::warn!("Cannot listen for Ctrl-C ({e}); serving until killed");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("Review server error: {}", e));

    pool.close().await;
    served
}
