//! End-of-run reporting.

use std::time::Instant;

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{EventType, ProcessingStats};

/// Logs throughput so far.
pub fn log_progress(start_time: Instant, records_processed: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        records_processed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Geocoded {} records in {:.2} seconds (~{:.2} records/sec)",
        records_processed, elapsed_secs, rate
    );
}

/// Prints the non-zero event counters of a run to the log.
pub fn print_statistics(stats: &ProcessingStats) {
    let total: usize = EventType::iter().map(|event| stats.get(event)).sum();
    if total == 0 {
        return;
    }
    info!("Run statistics:");
    for event in EventType::iter() {
        let count = stats.get(event);
        if count > 0 {
            info!("   {}: {}", event.as_str(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_statistics_empty() {
        // Should not panic when nothing happened
        print_statistics(&ProcessingStats::new());
    }

    #[test]
    fn test_print_statistics_with_events() {
        let stats = ProcessingStats::new();
        stats.increment(EventType::NetworkRequest);
        stats.add(EventType::RowWritten, 4);
        print_statistics(&stats);
        log_progress(Instant::now(), 1);
    }
}
