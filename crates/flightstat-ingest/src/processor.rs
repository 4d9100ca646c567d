//! File processor: one record file in, per-file counts and clean records out.
//!
//! This is the unit of parallel work. It owns everything it touches and shares
//! nothing, so any number of invocations may run at once.

use flightstat_common::{FlightError, FlightRecord, RawFlightRecord, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of processing one record file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIngestResult {
    /// File the records were read from
    pub path: PathBuf,

    /// Number of records in the file
    pub total_count: usize,

    /// Records with at least one absent field
    pub dirty_count: usize,

    /// Records with no absent field, in file order
    pub clean_records: Vec<FlightRecord>,
}

impl FileIngestResult {
    pub fn clean_count(&self) -> usize {
        self.clean_records.len()
    }
}

/// Read and classify one record file.
pub fn process_file(path: &Path) -> Result<FileIngestResult> {
    let bytes = std::fs::read(path).map_err(|e| FlightError::io(path, e))?;
    let result = parse_records(path, &bytes)?;

    debug!(
        path = %path.display(),
        total = result.total_count,
        dirty = result.dirty_count,
        "Processed record file"
    );

    Ok(result)
}

/// Classify already-read file content. `path` is only used for reporting.
pub fn parse_records(path: &Path, bytes: &[u8]) -> Result<FileIngestResult> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| FlightError::format(path, format!("invalid JSON: {}", e)))?;

    let Value::Array(items) = document else {
        return Err(FlightError::format(
            path,
            "expected a list of record objects at the top level",
        ));
    };

    let total_count = items.len();
    let mut dirty_count = 0;
    let mut clean_records = Vec::with_capacity(total_count);

    for (index, item) in items.iter().enumerate() {
        let raw = RawFlightRecord::from_value(item)
            .map_err(|message| FlightError::format(path, format!("record {}: {}", index, message)))?;

        match raw.into_clean() {
            Some(record) => clean_records.push(record),
            None => dirty_count += 1,
        }
    }

    Ok(FileIngestResult {
        path: path.to_path_buf(),
        total_count,
        dirty_count,
        clean_records,
    })
}
