//! Expansion of a resolved record into output rows.

use crate::config::DERIVED_COLUMNS;
use crate::geocode::GeocodeResult;
use crate::resolve::Resolution;

/// Builds the output rows for one input record.
///
/// Each row is the input values followed by the derived columns, in
/// [`DERIVED_COLUMNS`](crate::config::DERIVED_COLUMNS) order. A record without
/// results yields one row where only the locality id and result count are set.
/// Otherwise there is one row per result, or only the first when
/// `first_match_only` is set.
pub fn expand_record(
    locality_id: usize,
    input: &[String],
    resolution: &Resolution,
    first_match_only: bool,
) -> Vec<Vec<String>> {
    let set = &resolution.result_set;
    let num_results = set.num_results.to_string();

    if set.results.is_empty() {
        let mut row = input.to_vec();
        row.push(locality_id.to_string());
        // Everything between the locality id and the result count stays blank.
        row.resize(row.len() + DERIVED_COLUMNS.len() - 2, String::new());
        row.push(num_results);
        return vec![row];
    }

    let take = if first_match_only { 1 } else { set.results.len() };
    let field_used = resolution.field_used.clone().unwrap_or_default();

    set.results
        .iter()
        .take(take)
        .enumerate()
        .map(|(i, result)| {
            let mut row = input.to_vec();
            row.push(locality_id.to_string());
            row.push((i + 1).to_string());
            row.extend(result_columns(result));
            row.push(field_used.clone());
            row.push(num_results.clone());
            row
        })
        .collect()
}

/// Latitude through parse pattern.
fn result_columns(result: &GeocodeResult) -> [String; 7] {
    [
        format_number(result.latitude),
        format_number(result.longitude),
        result
            .uncertainty_radius_meters
            .map(format_number)
            .unwrap_or_default(),
        format_polygon(&result.uncertainty_polygon),
        result.score.map(format_number).unwrap_or_default(),
        result.precision.clone(),
        result.parse_pattern.clone(),
    ]
}

/// Shortest representation that reads back to the same value (`500.0` → `500`).
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// `lat,lon,lat,lon,...`
pub fn format_polygon(vertices: &[(f64, f64)]) -> String {
    vertices
        .iter()
        .flat_map(|&(lat, lon)| [format_number(lat), format_number(lon)])
        .collect::<Vec<_>>()
        .join(",")
}
