//! Review server state and wire types.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ReviewConfig;
use crate::storage::DbPool;

/// Table and column names the review queries are built from.
#[derive(Debug, Clone)]
pub struct ReviewTables {
    pub input_table: String,
    pub output_table: String,
    pub country_column: String,
    pub state_column: String,
    pub county_column: String,
    pub locality_columns: Vec<String>,
}

impl From<&ReviewConfig> for ReviewTables {
    fn from(config: &ReviewConfig) -> Self {
        ReviewTables {
            input_table: config.input_table.clone(),
            output_table: config.output_table.clone(),
            country_column: config.country_column.clone(),
            state_column: config.state_column.clone(),
            county_column: config.county_column.clone(),
            locality_columns: config.locality_columns.clone(),
        }
    }
}

/// Shared state for the review handlers.
#[derive(Clone)]
pub struct ReviewState {
    pub pool: DbPool,
    pub tables: Arc<ReviewTables>,
}

impl ReviewState {
    pub fn new(pool: DbPool, tables: ReviewTables) -> Self {
        ReviewState {
            pool,
            tables: Arc::new(tables),
        }
    }
}

/// A geocoded record awaiting review.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index of the locality column that produced the match
    pub field_index: usize,
    pub locality: String,
    pub country: String,
    pub state: String,
    pub county: String,
    pub locality_id: String,
    pub result_id: String,
    pub latitude: String,
    pub longitude: String,
    pub parse_pattern: String,
    pub precision: String,
    pub score: String,
    pub uncertainty: String,
}

impl Candidate {
    /// Form-encoded body read by the review page.
    ///
    /// `points` is `lat|lon|parsePattern|precision(score)|uncertainty`.
    pub fn to_body(&self) -> String {
        let points = [
            self.latitude.clone(),
            self.longitude.clone(),
            self.parse_pattern.clone(),
            format!("{}({})", self.precision, self.score),
            self.uncertainty.clone(),
        ]
        .join("|");
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("k", &self.field_index.to_string())
            .append_pair("locality", &self.locality)
            .append_pair("country", &self.country)
            .append_pair("state", &self.state)
            .append_pair("county", &self.county)
            .append_pair("lid", &self.locality_id)
            .append_pair("rid", &self.result_id)
            .append_pair("points", &points)
            .finish()
    }
}

/// Form posted by the review page when a point is approved.
#[derive(Debug, Default, Deserialize)]
pub struct SaveForm {
    pub lid: Option<String>,
    pub rid: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub u: Option<String>,
    pub p: Option<String>,
}

/// A validated approved point.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedPoint {
    pub locality_id: String,
    pub result_id: String,
    pub latitude: String,
    pub longitude: String,
    pub uncertainty_radius: String,
    pub uncertainty_polygon: String,
}

impl TryFrom<SaveForm> for ApprovedPoint {
    type Error = String;

    fn try_from(form: SaveForm) -> Result<Self, Self::Error> {
        fn required(value: Option<String>, name: &str) -> Result<String, String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("missing {name}"))
        }
        fn coordinate(value: String, name: &str, limit: f64) -> Result<String, String> {
            match value.parse::<f64>() {
                Ok(v) if v.is_finite() && v.abs() <= limit => Ok(value),
                _ => Err(format!("{name} must be a number between -{limit} and {limit}")),
            }
        }

        Ok(ApprovedPoint {
            locality_id: required(form.lid, "lid")?,
            result_id: required(form.rid, "rid")?,
            latitude: coordinate(required(form.lat, "lat")?, "lat", 90.0)?,
            longitude: coordinate(required(form.lon, "lon")?, "lon", 180.0)?,
            uncertainty_radius: form.u.unwrap_or_default(),
            uncertainty_polygon: form.p.unwrap_or_default(),
        })
    }
}
