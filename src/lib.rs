//! geolocate_batch library: batch georeferencing through the GEOLocate web service
//!
//! This library reads a CSV of locality descriptions, resolves each record
//! through the GEOLocate service (trying several locality columns in order of
//! preference), and appends the matches to an output CSV. Service responses
//! can be cached in SQLite, and an interrupted run resumes where it stopped.
//! A small review server lets an operator confirm or correct the points.
//!
//! # Example
//!
//! ```no_run
//! use geolocate_batch::{run_batch, BatchConfig};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig {
//!     input: PathBuf::from("specimens.csv"),
//!     output: PathBuf::from("specimens_georef.csv"),
//!     locality_columns: vec!["verbatimLocality".into(), "locality".into()],
//!     cache_path: Some(PathBuf::from("glc_cache.db")),
//!     ..Default::default()
//! };
//!
//! let report = run_batch(&config).await?;
//! println!("Geocoded {} records, {} rows written",
//!          report.records_processed, report.rows_written);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod error_handling;
pub mod geocode;
pub mod initialization;
pub mod resolve;
pub mod review;
pub mod run;
pub mod storage;

// Re-export public API
pub use config::{BatchConfig, GeocodeOptions, LogFormat, LogLevel, ReviewConfig};
pub use error_handling::{BatchError, ConfigurationError, GeocodeError};
pub use geocode::{GeocodeClient, GeocodeResult, GeocodeResultSet, Provenance};
pub use resolve::{resolve, Resolution};
pub use review::start_review_server;
pub use run::{run_batch, BatchReport};
pub use storage::ResponseCache;
