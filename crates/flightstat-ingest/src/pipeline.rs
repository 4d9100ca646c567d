//! End-to-end run: discovery, parallel ingestion, aggregation

use flightstat_common::Result;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::aggregate::aggregate;
use crate::config::AnalyzeConfig;
use crate::coordinator::ingest_files;
use crate::discovery::discover_files;
use crate::report::ReportSeries;

/// Discover the record files under `config.input_dir` and analyze them.
pub async fn run(config: &AnalyzeConfig) -> Result<ReportSeries> {
    config.validate()?;

    let files = discover_files(&config.input_dir, &config.extension)?;
    run_files(&files, config).await
}

/// Analyze an explicit list of record files.
///
/// Any failing file, or a batch with no clean records, fails the whole run.
pub async fn run_files(files: &[PathBuf], config: &AnalyzeConfig) -> Result<ReportSeries> {
    config.validate()?;

    let start_time = Instant::now();

    let dataset = ingest_files(files, config.worker_count()).await?;
    let report = aggregate(&dataset, config.top_n)?;

    let elapsed = start_time.elapsed();
    info!(
        files = files.len(),
        elapsed_secs = elapsed.as_secs_f64(),
        "Analysis complete"
    );

    Ok(ReportSeries::new(&dataset, report, elapsed))
}
