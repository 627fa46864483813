//! GEOLocate web service client.
//!
//! This module provides:
//! - Canonical request construction (`GeocodeRequest`), whose encoded form is
//!   both the HTTP body and the cache key
//! - Response parsing into `GeocodeResultSet`
//! - The client that consults the response cache before the network
//! - Request pacing toward the service

mod client;
mod request;
mod response;
mod throttle;

// Re-export public API
pub use client::GeocodeClient;
pub use request::GeocodeRequest;
pub use response::{
    parse_result_set, Displacement, GeocodeResult, GeocodeResultSet, Provenance,
};
pub use throttle::RequestThrottle;
