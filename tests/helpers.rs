// Shared test helpers for the batch and review integration tests.
//
// Builds service responses, input files, and batch configurations pointed at
// a wiremock server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geolocate_batch::BatchConfig;

/// One GeoJSON feature as the service returns it.
#[allow(dead_code)]
pub fn feature(lon: f64, lat: f64, uncertainty: f64, pattern: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lon, lat] },
        "properties": {
            "parsePattern": pattern,
            "precision": "High",
            "score": 88,
            "uncertaintyRadiusMeters": uncertainty,
            "uncertaintyPolygon": "Unavailable",
            "displacedDistanceMiles": 0,
            "displacedHeadingDegrees": 0,
            "debug": ":GazPartMatch=False"
        }
    })
}

/// A complete response body for `features`.
#[allow(dead_code)]
pub fn glc_response(features: Vec<Value>) -> String {
    json!({
        "engineVersion": "GLC:6.0|U:1.01374|eng:1.0",
        "numResults": features.len(),
        "executionTimems": 15.6,
        "resultSet": { "type": "FeatureCollection", "features": features }
    })
    .to_string()
}

/// The Lawrence, Kansas match.
#[allow(dead_code)]
pub fn lawrence_response() -> String {
    glc_response(vec![feature(-95.2353, 38.9717, 500.0, "LAWRENCE")])
}

#[allow(dead_code)]
pub fn empty_response() -> String {
    glc_response(Vec::new())
}

/// Answers requests for `locality` with `body`. `expect` is verified when the
/// server is dropped.
#[allow(dead_code)]
pub async fn mount_locality(server: &MockServer, locality: &str, body: String, expect: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(body_string_contains(format!("locality={locality}&")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body));
    let mock = match expect {
        Some(times) => mock.expect(times),
        None => mock,
    };
    mock.mount(server).await;
}

/// Writes `contents` to `dir/name` and returns the path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// Batch configuration against `server` without request pacing.
#[allow(dead_code)]
pub fn batch_config(server: &MockServer, input: &Path, output: &Path) -> BatchConfig {
    BatchConfig {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        endpoint: format!("{}/webservices/geolocatesvcv2/glcwrap.aspx", server.uri()),
        request_delay: Duration::ZERO,
        timeout_seconds: 5,
        ..Default::default()
    }
}

/// Output rows (header excluded) as string vectors.
#[allow(dead_code)]
pub fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open output");
    let header = reader
        .headers()
        .expect("Output has no header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("Bad output row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

/// Value of `column` in `row`.
#[allow(dead_code)]
pub fn cell<'a>(header: &[String], row: &'a [String], column: &str) -> &'a str {
    let index = header
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("No column {column}"));
    &row[index]
}
