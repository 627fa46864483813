//! Configuration constants.
//!
//! This module defines the defaults used throughout the application, including
//! the remote endpoint, request pacing, and the derived output column names.

use std::time::Duration;

/// GEOLocate web service endpoint (JSON wrapper).
pub const DEFAULT_ENDPOINT: &str =
    "http://www.geo-locate.org/webservices/geolocatesvcv2/glcwrap.aspx";

/// Minimum pause between two live requests to the geocoding service.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(600);

/// Per-request HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Records between two progress log lines.
pub const PROGRESS_LOG_INTERVAL: usize = 100;

pub const DEFAULT_USER_AGENT: &str = concat!("geolocate_batch/", env!("CARGO_PKG_VERSION"));

// Input column defaults
pub const DEFAULT_COUNTRY_COLUMN: &str = "country";
pub const DEFAULT_STATE_COLUMN: &str = "stateProvince";
pub const DEFAULT_COUNTY_COLUMN: &str = "county";
pub const DEFAULT_LOCALITY_COLUMN: &str = "locality";

/// Highest `languageKey` the service accepts.
pub const MAX_LANGUAGE_KEY: u8 = 4;

// Derived output columns, appended to the input header in this order.
pub const COL_LOCALITY_ID: &str = "geolocate_LocalityID";
pub const COL_RESULT_ID: &str = "geolocate_ResultID";
pub const COL_LATITUDE: &str = "geolocate_Latitude";
pub const COL_LONGITUDE: &str = "geolocate_Longitude";
pub const COL_UNCERTAINTY_RADIUS: &str = "geolocate_UncertaintyRadiusMeters";
pub const COL_UNCERTAINTY_POLYGON: &str = "geolocate_UncertaintyPolygon";
pub const COL_SCORE: &str = "geolocate_Score";
pub const COL_PRECISION: &str = "geolocate_Precision";
pub const COL_PARSE_PATTERN: &str = "geolocate_ParsePattern";
pub const COL_FIELD_USED: &str = "geolocate_locFieldUsed";
pub const COL_NUM_RESULTS: &str = "geolocate_NumResults";

/// All derived columns written after the input columns.
/// The order here is the order in the output file.
pub const DERIVED_COLUMNS: &[&str] = &[
    COL_LOCALITY_ID,
    COL_RESULT_ID,
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_UNCERTAINTY_RADIUS,
    COL_UNCERTAINTY_POLYGON,
    COL_SCORE,
    COL_PRECISION,
    COL_PARSE_PATTERN,
    COL_FIELD_USED,
    COL_NUM_RESULTS,
];

// Review server
pub const DEFAULT_REVIEW_PORT: u16 = 8080;
pub const DEFAULT_REVIEW_HOST: &str = "127.0.0.1";
/// Body returned by `/getrec` once every candidate has been reviewed.
pub const END_OF_DATA: &str = "locality=End of Data Reached";
