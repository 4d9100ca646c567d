//! Parallel ingestion coordinator
//!
//! Fans a batch of record files out over a bounded pool of blocking workers and
//! folds the per-file results into one [`GlobalDataset`] once every worker is done.
//!
//! All-or-nothing: the first failing file stops dispatch, in-flight workers are
//! drained, and that failure is returned. No partial dataset is ever produced.

use flightstat_common::{FlightError, FlightRecord, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::{Id, JoinSet};
use tracing::{error, info, warn};

use crate::processor::{process_file, FileIngestResult};

/// Per-file counts, kept in input order for the dirty/clean series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub total: usize,
    pub dirty: usize,
}

impl FileSummary {
    pub fn clean(&self) -> usize {
        self.total - self.dirty
    }
}

/// Merged outcome of an ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalDataset {
    pub total_records: usize,
    pub dirty_records: usize,
    pub clean_records: Vec<FlightRecord>,
    pub files: Vec<FileSummary>,
}

impl GlobalDataset {
    /// Fold one file's result into the dataset.
    ///
    /// Counts are summed and clean records appended, so folding the same set
    /// of results in any order gives the same totals and the same clean-record
    /// multiset.
    pub fn merge(mut self, result: FileIngestResult) -> Self {
        self.total_records += result.total_count;
        self.dirty_records += result.dirty_count;
        self.files.push(FileSummary {
            path: result.path,
            total: result.total_count,
            dirty: result.dirty_count,
        });
        self.clean_records.extend(result.clean_records);
        self
    }

    pub fn from_results(results: impl IntoIterator<Item = FileIngestResult>) -> Self {
        results.into_iter().fold(Self::default(), Self::merge)
    }

    pub fn clean_count(&self) -> usize {
        self.clean_records.len()
    }

    /// Dirty count per file, in input order
    pub fn null_counts(&self) -> Vec<usize> {
        self.files.iter().map(|f| f.dirty).collect()
    }

    /// Clean count per file, in input order
    pub fn clean_counts(&self) -> Vec<usize> {
        self.files.iter().map(FileSummary::clean).collect()
    }

    /// `total_records == dirty_records + clean_records.len()`
    pub fn check_invariant(&self) -> bool {
        self.total_records == self.dirty_records + self.clean_records.len()
    }
}

/// Process `paths` on at most `workers` blocking tasks and merge the results.
///
/// Completion order does not matter: results are slotted by input index and
/// folded in input order after the last worker has been joined. Every worker
/// spawned by this call has finished before it returns, on success or error.
pub async fn ingest_files(paths: &[PathBuf], workers: usize) -> Result<GlobalDataset> {
    run_batch(paths, workers, process_file).await
}

/// Worker pool behind [`ingest_files`], generic over the per-file step.
///
/// Each spawned task is tracked by its task id, so a worker that dies without
/// returning (a panic, or cancellation on runtime shutdown) is still reported
/// as a [`FlightError::Worker`] naming its file.
async fn run_batch<F>(paths: &[PathBuf], workers: usize, process: F) -> Result<GlobalDataset>
where
    F: Fn(&Path) -> Result<FileIngestResult> + Send + Sync + Copy + 'static,
{
    if workers == 0 {
        return Err(FlightError::Config("workers must be at least 1".into()));
    }

    let start_time = Instant::now();

    info!(
        files = paths.len(),
        workers,
        "Starting parallel ingestion"
    );

    let mut pending = paths.iter().cloned().enumerate();
    let mut in_flight: JoinSet<(usize, Result<FileIngestResult>)> = JoinSet::new();
    let mut owners: HashMap<Id, PathBuf> = HashMap::new();
    let mut slots: Vec<Option<FileIngestResult>> = paths.iter().map(|_| None).collect();
    let mut first_error: Option<FlightError> = None;

    loop {
        // Keep the pool full until the batch fails or runs out of files
        while first_error.is_none() && in_flight.len() < workers {
            let Some((index, path)) = pending.next() else {
                break;
            };
            let owner = path.clone();
            let handle = in_flight.spawn_blocking(move || (index, process(&path)));
            owners.insert(handle.id(), owner);
        }

        let Some(joined) = in_flight.join_next_with_id().await else {
            break;
        };

        let failure = match joined {
            Ok((id, (index, Ok(result)))) => {
                owners.remove(&id);
                slots[index] = Some(result);
                None
            },
            Ok((id, (_, Err(e)))) => {
                owners.remove(&id);
                Some(e)
            },
            Err(join_err) => {
                let path = owners.remove(&join_err.id()).unwrap_or_default();
                let message = if join_err.is_panic() {
                    "worker panicked".to_string()
                } else {
                    join_err.to_string()
                };
                Some(FlightError::Worker { path, message })
            },
        };

        if let Some(e) = failure {
            if first_error.is_none() {
                error!(error = %e, "File failed, aborting batch");
                first_error = Some(e);
            } else {
                warn!(error = %e, "Additional file failure while draining batch");
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let dataset = GlobalDataset::from_results(slots.into_iter().flatten());

    info!(
        files = dataset.files.len(),
        total = dataset.total_records,
        dirty = dataset.dirty_records,
        clean = dataset.clean_count(),
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "Parallel ingestion complete"
    );

    Ok(dataset)
}
