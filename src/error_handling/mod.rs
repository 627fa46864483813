//! Error handling and run statistics.
//!
//! This module provides:
//! - Error type definitions for configuration, initialization, storage,
//!   geocoding and batch I/O failures
//! - Run statistics tracking (cache hits, service requests, zero-result records)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    BatchError, ConfigurationError, DatabaseError, EventType, GeocodeError, InitializationError,
};
