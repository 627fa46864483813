//! Error type definitions.
//!
//! This module defines all error types and the run event taxonomy used
//! throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Invalid or missing command-line input, detected before any I/O.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("missing required argument {0}")]
    MissingArgument(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Failures of a single geocode call.
///
/// None of these are retried; the batch runner treats every variant as fatal
/// and relies on restart-and-resume for recovery.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// The service could not be reached or answered with a non-success status.
    #[error("Geocoding service request failed: {0}")]
    Transport(#[from] ReqwestError),

    /// The payload could not be read as a result set.
    #[error("Malformed geocoding response: {reason}")]
    MalformedResponse { reason: String },

    /// The response cache could not be read or written.
    #[error("Response cache error: {0}")]
    Cache(#[from] DatabaseError),
}

impl GeocodeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        GeocodeError::MalformedResponse {
            reason: reason.into(),
        }
    }
}

/// Input/output problems of a batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// A configured column is not present in the input header.
    #[error("Input file has no column named '{column}'")]
    MissingColumn { column: String },

    /// The existing output file was written for a different input layout.
    #[error("Existing output file {path} has a header that does not match this input; refusing to append")]
    HeaderMismatch { path: String },

    /// An existing output row has an unreadable locality id.
    #[error("Existing output file has an invalid {column} value '{value}' on row {row}")]
    CorruptOutput {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Notable events counted during a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum EventType {
    /// Result set served from the response cache
    CacheHit,
    /// Result set fetched from the service
    NetworkRequest,
    /// Input record geocoded in this run
    RecordProcessed,
    /// Input record already present in the output (resume)
    RecordSkipped,
    /// Record matched on a fallback locality column
    FallbackMatch,
    /// Record with no match on any locality column
    ZeroResults,
    /// Output row appended
    RowWritten,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CacheHit => "Cache hits",
            EventType::NetworkRequest => "Service requests",
            EventType::RecordProcessed => "Records geocoded",
            EventType::RecordSkipped => "Records skipped (already in output)",
            EventType::FallbackMatch => "Matched on a fallback locality field",
            EventType::ZeroResults => "Records without results",
            EventType::RowWritten => "Rows written",
        }
    }
}
