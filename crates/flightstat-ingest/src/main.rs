//! Flightstat - flight record ingestion and analytics

use anyhow::{Context, Result};
use clap::Parser;
use flightstat_common::logging::{init_logging, LogConfig, LogLevel};
use flightstat_ingest::config::AnalyzeConfig;
use flightstat_ingest::pipeline;
use flightstat_ingest::report::{JsonSink, LogSink, ReportSink};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "flightstat")]
#[command(author, version, about = "Clean and analyze per-city flight record files")]
struct Cli {
    /// Directory holding the record files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Record file extension
    #[arg(short, long)]
    extension: Option<String>,

    /// Worker pool size (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Number of top destinations to analyze
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Write the JSON report to this file ("-" for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Environment configuration with command-line flags layered on top
    fn analyze_config(&self) -> Result<AnalyzeConfig> {
        let mut config = AnalyzeConfig::from_env()?;
        if let Some(ref dir) = self.input_dir {
            config = config.with_input_dir(dir);
        }
        if let Some(ref extension) = self.extension {
            config = config.with_extension(extension.trim_start_matches('.'));
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(top_n) = self.top_n {
            config = config.with_top_n(top_n);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("flightstat")
        .build()
        .apply_env()?;

    let _guard = init_logging(&log_config)?;

    let config = cli.analyze_config()?;
    info!(
        input_dir = %config.input_dir.display(),
        workers = config.worker_count(),
        top_n = config.top_n,
        "Analyzing flight records"
    );

    let series = pipeline::run(&config)
        .await
        .context("Analysis failed, no report produced")?;

    LogSink.emit(&series)?;

    match cli.output {
        Some(ref path) if path.as_os_str() == "-" => {
            JsonSink::new(std::io::stdout().lock()).emit(&series)?;
        },
        Some(ref path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?;
            JsonSink::new(std::io::BufWriter::new(file)).emit(&series)?;
            info!(path = %path.display(), "Report written");
        },
        None => {},
    }

    Ok(())
}
