//! Output CSV: resume inspection and incremental appends.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use csv::StringRecord;
use log::{info, warn};

use crate::config::{COL_LOCALITY_ID, COL_NUM_RESULTS, DERIVED_COLUMNS};
use crate::error_handling::BatchError;

/// Output header: the input header followed by the derived columns.
pub fn output_header(input_header: &StringRecord) -> Vec<String> {
    input_header
        .iter()
        .map(str::to_string)
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// What a previous run left in the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeState {
    /// Input records already geocoded (highest locality id written).
    pub records_done: usize,
    /// Data rows present in the file.
    pub rows_found: usize,
    /// The file is empty, so the header has yet to be written.
    pub needs_header: bool,
}

impl ResumeState {
    fn fresh() -> Self {
        ResumeState {
            records_done: 0,
            rows_found: 0,
            needs_header: true,
        }
    }
}

/// Inspects an existing output file before appending to it.
///
/// A trailing line without a newline is a record torn by an interrupted write
/// and is cut off. The remaining header must equal `expected_header`. If the
/// last locality id has fewer rows than it should (one in first-match mode or
/// for zero results, otherwise `geolocate_NumResults`), its rows are cut off
/// too and the record counts as not done.
///
/// # Errors
///
/// - `BatchError::HeaderMismatch` if the file was written for another layout
/// - `BatchError::CorruptOutput` if a locality id or result count cannot be read
/// - `BatchError::Csv` / `BatchError::Io` on read failures
pub fn inspect_existing_output(
    path: &Path,
    expected_header: &[String],
    first_match_only: bool,
) -> Result<ResumeState, BatchError> {
    let contents = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ResumeState::fresh()),
        Err(e) => return Err(e.into()),
    };

    let complete_len = match contents.iter().rposition(|&b| b == b'\n') {
        Some(last_newline) => last_newline + 1,
        None => 0,
    };
    if complete_len < contents.len() {
        warn!(
            "Discarding {} bytes of an incomplete last line in {}",
            contents.len() - complete_len,
            path.display()
        );
        OpenOptions::new()
            .write(true)
            .open(path)?
            .set_len(complete_len as u64)?;
    }
    if complete_len == 0 {
        return Ok(ResumeState::fresh());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(&contents[..complete_len]);
    if reader
        .headers()?
        .iter()
        .ne(expected_header.iter().map(String::as_str))
    {
        return Err(BatchError::HeaderMismatch {
            path: path.display().to_string(),
        });
    }

    let id_index = expected_header.len() - DERIVED_COLUMNS.len();
    let count_index = expected_header.len() - 1;
    let mut state = ResumeState {
        records_done: 0,
        rows_found: 0,
        needs_header: false,
    };
    let mut last: Option<RecordSpan> = None;
    let mut row = StringRecord::new();
    loop {
        let offset = reader.position().byte();
        if !reader.read_record(&mut row)? {
            break;
        }
        state.rows_found += 1;
        let locality_id = parse_count(&row, id_index, COL_LOCALITY_ID, state.rows_found)?;
        let num_results = parse_count(&row, count_index, COL_NUM_RESULTS, state.rows_found)?;

        let span = match last.take() {
            Some(span) if span.locality_id == locality_id => span,
            _ => RecordSpan {
                locality_id,
                offset,
                rows: 0,
                expected_rows: 0,
                done_before: state.records_done,
            },
        };
        last = Some(RecordSpan {
            rows: span.rows + 1,
            expected_rows: if first_match_only || num_results == 0 {
                1
            } else {
                num_results
            },
            ..span
        });
        state.records_done = state.records_done.max(locality_id);
    }

    // An interrupted append can leave only some of the last record's rows.
    if let Some(span) = last.filter(|span| span.rows < span.expected_rows) {
        warn!(
            "Record {} has {} of {} rows in {}; writing it again",
            span.locality_id,
            span.rows,
            span.expected_rows,
            path.display()
        );
        OpenOptions::new()
            .write(true)
            .open(path)?
            .set_len(span.offset)?;
        state.records_done = span.done_before;
        state.rows_found -= span.rows;
    }

    if state.rows_found > 0 {
        info!(
            "Resuming: {} records ({} rows) already in {}",
            state.records_done,
            state.rows_found,
            path.display()
        );
    }
    Ok(state)
}

/// Consecutive output rows sharing one locality id.
#[derive(Debug, Clone, Copy)]
struct RecordSpan {
    locality_id: usize,
    /// Byte offset of the first row
    offset: u64,
    rows: usize,
    expected_rows: usize,
    /// Records done before this one
    done_before: usize,
}

fn parse_count(
    row: &StringRecord,
    index: usize,
    column: &'static str,
    row_number: usize,
) -> Result<usize, BatchError> {
    let value = row.get(index).unwrap_or("");
    value.parse().map_err(|_| BatchError::CorruptOutput {
        column,
        value: value.to_string(),
        row: row_number,
    })
}

/// Append-only CSV output.
///
/// Each record's rows are encoded in memory and appended with a single write,
/// then flushed, so a record is never split across buffer flushes.
pub struct OutputSink {
    file: File,
}

impl OutputSink {
    /// Opens `path` for appending, writing `header` first when `needs_header`.
    pub fn open_append(path: &Path, header: &[String], needs_header: bool) -> Result<Self, BatchError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut sink = OutputSink { file };
        if needs_header {
            sink.append(&encode_rows(&[header.to_vec()])?)?;
        }
        Ok(sink)
    }

    /// Appends the rows of one record and flushes them to disk.
    pub fn write_rows(&mut self, rows: &[Vec<String>]) -> Result<(), BatchError> {
        let bytes = encode_rows(rows)?;
        self.append(&bytes)
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), BatchError> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        Ok(())
    }
}

fn encode_rows(rows: &[Vec<String>]) -> Result<Vec<u8>, BatchError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| BatchError::Io(e.into_error()))
}
