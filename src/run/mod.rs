//! Resumable batch geocoding of a CSV file.

pub mod expand;
pub mod finalize;
pub mod input;
pub mod output;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::config::{BatchConfig, PROGRESS_LOG_INTERVAL};
use crate::error_handling::{EventType, ProcessingStats};
use crate::geocode::{GeocodeClient, RequestThrottle};
use crate::initialization::init_client;
use crate::resolve::resolve;
use crate::storage::ResponseCache;

use expand::expand_record;
use finalize::{log_progress, print_statistics};
use input::{ColumnLayout, InputSource};
use output::{inspect_existing_output, output_header, OutputSink};

/// Summary of a completed batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Input records read, including those skipped on resume
    pub records_read: usize,
    /// Records geocoded in this run
    pub records_processed: usize,
    /// Records already present in the output before this run
    pub records_skipped: usize,
    pub rows_written: usize,
    pub zero_result_records: usize,
    pub cache_hits: usize,
    pub network_requests: usize,
    pub output: PathBuf,
    pub elapsed_seconds: f64,
}

/// Geocodes every record of `config.input` into `config.output`.
///
/// An existing output file is resumed: records up to the highest locality id
/// it contains are read but not geocoded again, and new rows are appended.
/// Rows are flushed after each record, so an aborted run can be restarted
/// with the same arguments.
///
/// # Errors
///
/// Fails on invalid configuration, unreadable input, a missing locality
/// column, an output file written for another layout, and on the first
/// geocoding failure (transport, malformed response or cache). The response
/// cache is closed on every path.
pub async fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
    config.validate().context("Invalid batch configuration")?;
    let start_time = Instant::now();

    let mut source = InputSource::open(&config.input)
        .with_context(|| format!("Failed to open input file {}", config.input.display()))?;
    let layout = ColumnLayout::resolve(source.headers(), config)?;
    let header = output_header(source.headers());

    let resume = inspect_existing_output(&config.output, &header, config.first_match_only)
        .with_context(|| format!("Failed to inspect output file {}", config.output.display()))?;
    if resume.records_done > 0 {
        info!("Skipping the first {} input records", resume.records_done);
    }
    let mut sink = OutputSink::open_append(&config.output, &header, resume.needs_header)
        .with_context(|| format!("Failed to open output file {}", config.output.display()))?;

    let http = init_client(config).context("Failed to initialize HTTP client")?;
    let cache = match &config.cache_path {
        Some(path) => ResponseCache::open(path)
            .await
            .with_context(|| format!("Failed to open response cache {}", path.display()))?,
        None => ResponseCache::disabled(),
    };
    let mut client = GeocodeClient::new(
        http,
        config.endpoint.clone(),
        config.options,
        cache,
        RequestThrottle::new(config.request_delay),
    );

    info!(
        "Geocoding {} using locality fields [{}]",
        config.input.display(),
        config.locality_columns.join(", ")
    );

    let stats = ProcessingStats::new();
    let outcome = process_records(
        &mut client,
        &mut source,
        &layout,
        &mut sink,
        config,
        resume.records_done,
        &stats,
        start_time,
    )
    .await;
    client.close().await;
    let records_read = outcome?;

    let records_processed = stats.get(EventType::RecordProcessed);
    log_progress(start_time, records_processed);
    print_statistics(&stats);

    Ok(BatchReport {
        records_read,
        records_processed,
        records_skipped: stats.get(EventType::RecordSkipped),
        rows_written: stats.get(EventType::RowWritten),
        zero_result_records: stats.get(EventType::ZeroResults),
        cache_hits: stats.get(EventType::CacheHit),
        network_requests: stats.get(EventType::NetworkRequest),
        output: config.output.clone(),
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}

/// Main loop. Returns the number of input records read.
#[allow(clippy::too_many_arguments)]
async fn process_records(
    client: &mut GeocodeClient,
    source: &mut InputSource,
    layout: &ColumnLayout,
    sink: &mut OutputSink,
    config: &BatchConfig,
    records_done: usize,
    stats: &ProcessingStats,
    start_time: Instant,
) -> Result<usize> {
    let mut records_read = 0;
    for record in source {
        let record = record.context("Failed to read input record")?;
        if config.max_records.is_some_and(|cap| record.position > cap) {
            info!("Record limit of {} reached", record.position - 1);
            break;
        }
        records_read += 1;

        if record.position <= records_done {
            stats.increment(EventType::RecordSkipped);
            continue;
        }

        let resolution = resolve(client, &record, layout, stats)
            .await
            .with_context(|| format!("Failed to geocode input record {}", record.position))?;
        let rows = expand_record(
            record.position,
            record.values(),
            &resolution,
            config.first_match_only,
        );
        sink.write_rows(&rows)
            .with_context(|| format!("Failed to write output for record {}", record.position))?;

        stats.add(EventType::RowWritten, rows.len());
        stats.increment(EventType::RecordProcessed);
        let processed = stats.get(EventType::RecordProcessed);
        if processed % PROGRESS_LOG_INTERVAL == 0 {
            log_progress(start_time, processed);
        }
    }
    Ok(records_read)
}
