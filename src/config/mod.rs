//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoint, pacing defaults, output column names)
//! - CLI option types for both binaries
//! - Validated library configuration built from those options

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    BatchConfig, BatchOpt, GeocodeOptions, LogFormat, LogLevel, ReviewConfig, ReviewOpt,
};
