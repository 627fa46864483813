//! Geocoding response parsing.
//!
//! The service answers with a GeoJSON-flavoured document:
//!
//! ```json
//! {
//!   "engineVersion": "GLC:6.0|U:1.01374|eng:1.0",
//!   "numResults": 1,
//!   "resultSet": {
//!     "type": "FeatureCollection",
//!     "features": [{
//!       "type": "Feature",
//!       "geometry": { "type": "Point", "coordinates": [-95.2353, 38.9717] },
//!       "properties": { "uncertaintyRadiusMeters": 500, "precision": "High", ... }
//!     }]
//!   }
//! }
//! ```
//!
//! `engineVersion`, `numResults` and, when results are declared, every
//! feature's coordinates are required. Property values are read leniently
//! because the service reports unavailable values as strings.

use serde::Deserialize;
use serde_json::Value;

use crate::error_handling::GeocodeError;

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Network,
}

/// Relocation applied by the service to a match (e.g. "5 km N of ...").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub distance_miles: f64,
    pub heading_degrees: f64,
}

/// One candidate location.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub uncertainty_radius_meters: Option<f64>,
    /// Polygon vertices as `(latitude, longitude)`; empty when not computed.
    pub uncertainty_polygon: Vec<(f64, f64)>,
    pub precision: String,
    pub score: Option<f64>,
    pub parse_pattern: String,
    pub displacement: Option<Displacement>,
    pub debug: String,
}

/// The ranked candidates returned for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResultSet {
    pub engine_version: String,
    pub num_results: usize,
    pub results: Vec<GeocodeResult>,
    pub provenance: Provenance,
}

impl GeocodeResultSet {
    pub fn is_empty(&self) -> bool {
        self.num_results == 0
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    engine_version: Value,
    num_results: usize,
    #[serde(default)]
    result_set: Option<WireFeatureCollection>,
}

#[derive(Deserialize)]
struct WireFeatureCollection {
    #[serde(default)]
    features: Vec<WireFeature>,
}

#[derive(Deserialize)]
struct WireFeature {
    geometry: WireGeometry,
    #[serde(default)]
    properties: WireProperties,
}

#[derive(Deserialize)]
struct WireGeometry {
    coordinates: Vec<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireProperties {
    uncertainty_radius_meters: Value,
    uncertainty_polygon: Value,
    precision: Value,
    score: Value,
    parse_pattern: Value,
    displaced_distance_miles: Value,
    displaced_heading_degrees: Value,
    debug: Value,
}

/// Parses a raw service response.
///
/// # Errors
///
/// Returns `GeocodeError::MalformedResponse` when the payload is not JSON, a
/// required field is missing, a coordinate is unusable, or the number of
/// features differs from `numResults`.
pub fn parse_result_set(raw: &str, provenance: Provenance) -> Result<GeocodeResultSet, GeocodeError> {
    let wire: WireResponse = serde_json::from_str(raw)
        .map_err(|e| GeocodeError::malformed(format!("invalid JSON returned: {e}")))?;

    let engine_version = match wire.engine_version {
        Value::String(s) => s,
        Value::Null => return Err(GeocodeError::malformed("engineVersion is null")),
        other => other.to_string(),
    };

    let features = wire.result_set.map(|rs| rs.features).unwrap_or_default();
    if features.len() != wire.num_results {
        return Err(GeocodeError::malformed(format!(
            "numResults is {} but {} features were returned",
            wire.num_results,
            features.len()
        )));
    }

    let results = features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| convert_feature(i + 1, feature))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GeocodeResultSet {
        engine_version,
        num_results: wire.num_results,
        results,
        provenance,
    })
}

fn convert_feature(rank: usize, feature: WireFeature) -> Result<GeocodeResult, GeocodeError> {
    let (longitude, latitude) = match feature.geometry.coordinates.as_slice() {
        [lon, lat, ..] => (*lon, *lat),
        _ => {
            return Err(GeocodeError::malformed(format!(
                "feature {rank} has fewer than two coordinates"
            )))
        }
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        log::warn!("Result {rank} has out-of-range coordinates [{longitude}, {latitude}]");
    }

    let p = feature.properties;
    let displacement = match (
        lenient_f64(&p.displaced_distance_miles),
        lenient_f64(&p.displaced_heading_degrees),
    ) {
        (Some(distance_miles), Some(heading_degrees)) if distance_miles != 0.0 => Some(Displacement {
            distance_miles,
            heading_degrees,
        }),
        _ => None,
    };

    Ok(GeocodeResult {
        latitude,
        longitude,
        uncertainty_radius_meters: lenient_f64(&p.uncertainty_radius_meters),
        uncertainty_polygon: polygon_vertices(&p.uncertainty_polygon),
        precision: lenient_text(&p.precision),
        score: lenient_f64(&p.score),
        parse_pattern: lenient_text(&p.parse_pattern),
        displacement,
        debug: lenient_text(&p.debug),
    })
}

/// Numbers, or strings holding a number. Anything else ("Unavailable") is `None`.
fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn lenient_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads a GeoJSON polygon (first ring) or a bare list of `[lon, lat]` pairs.
fn polygon_vertices(value: &Value) -> Vec<(f64, f64)> {
    let ring = match value {
        Value::Object(map) => match map.get("coordinates") {
            Some(Value::Array(rings)) => match rings.first() {
                Some(Value::Array(first)) if first.first().is_some_and(Value::is_array) => first,
                _ => rings,
            },
            _ => return Vec::new(),
        },
        Value::Array(points) => points,
        _ => return Vec::new(),
    };
    ring.iter()
        .filter_map(|point| match point.as_array()?.as_slice() {
            [lon, lat, ..] => Some((lat.as_f64()?, lon.as_f64()?)),
            _ => None,
        })
        .collect()
}
