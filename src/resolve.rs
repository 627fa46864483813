//! Per-record locality resolution with column fallback.

use log::debug;

use crate::error_handling::{EventType, GeocodeError, ProcessingStats};
use crate::geocode::{GeocodeClient, GeocodeResultSet, Provenance};
use crate::run::input::{ColumnLayout, InputRecord};

/// Outcome of resolving one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The first non-empty result set, or the last (empty) one tried.
    pub result_set: GeocodeResultSet,
    /// Locality column that produced `result_set`; `None` when nothing matched.
    pub field_used: Option<String>,
}

/// Geocodes `record`, trying each locality column in priority order.
///
/// Stops at the first column whose result set is non-empty; no request is
/// made for the columns after it. When every column comes back empty, the
/// result set of the last column is returned with `field_used = None`.
///
/// # Errors
///
/// Any `GeocodeError` from the client is returned as is; the remaining
/// columns are not tried.
pub async fn resolve(
    client: &mut GeocodeClient,
    record: &InputRecord,
    layout: &ColumnLayout,
    stats: &ProcessingStats,
) -> Result<Resolution, GeocodeError> {
    let country = layout.country(record);
    let state = layout.state(record);
    let county = layout.county(record);

    let mut field = layout.primary_locality();
    let mut fallbacks = layout.fallback_localities().iter();
    loop {
        let locality = record.get(Some(field.index));
        let result_set = client.georef(locality, country, state, county).await?;
        stats.increment(match result_set.provenance {
            Provenance::Cache => EventType::CacheHit,
            Provenance::Network => EventType::NetworkRequest,
        });
        debug!(
            "Record {}: {} result(s) for {} = '{}' ({:?})",
            record.position, result_set.num_results, field.name, locality, result_set.provenance
        );

        if !result_set.is_empty() {
            if field != layout.primary_locality() {
                stats.increment(EventType::FallbackMatch);
            }
            return Ok(Resolution {
                result_set,
                field_used: Some(field.name.clone()),
            });
        }

        match fallbacks.next() {
            Some(next) => field = next,
            None => {
                stats.increment(EventType::ZeroResults);
                return Ok(Resolution {
                    result_set,
                    field_used: None,
                });
            }
        }
    }
}
