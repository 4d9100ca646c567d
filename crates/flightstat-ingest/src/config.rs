//! Analysis run configuration

use flightstat_common::{FlightError, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_INPUT_DIR: &str = "./tmp/flights";
pub const DEFAULT_EXTENSION: &str = "json";
pub const DEFAULT_TOP_N: usize = 25;

/// Configuration for one ingestion + aggregation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeConfig {
    /// Directory holding the per-origin-city record files
    pub input_dir: PathBuf,

    /// File extension that marks a record file (without the dot)
    pub extension: String,

    /// Worker pool size (None = available hardware parallelism)
    pub workers: Option<usize>,

    /// Number of destinations kept in the ranking
    pub top_n: usize,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            workers: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AnalyzeConfig {
    /// Create new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `FLIGHTSTAT_INPUT_DIR`, `FLIGHTSTAT_WORKERS`
    /// and `FLIGHTSTAT_TOP_N`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("FLIGHTSTAT_INPUT_DIR") {
            config.input_dir = PathBuf::from(dir);
        }

        if let Ok(workers) = std::env::var("FLIGHTSTAT_WORKERS") {
            config.workers = Some(parse_count("FLIGHTSTAT_WORKERS", &workers)?);
        }

        if let Ok(top_n) = std::env::var("FLIGHTSTAT_TOP_N") {
            config.top_n = parse_count("FLIGHTSTAT_TOP_N", &top_n)?;
        }

        Ok(config)
    }

    /// Set input directory
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set record file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set worker pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set ranking size
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Resolved worker pool size
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(FlightError::Config("workers must be at least 1".into()));
        }
        if self.top_n == 0 {
            return Err(FlightError::Config("top-n must be at least 1".into()));
        }
        if self.extension.is_empty() {
            return Err(FlightError::Config("extension must not be empty".into()));
        }
        Ok(())
    }
}

/// Available hardware parallelism, falling back to a single worker.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn parse_count(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| FlightError::Config(format!("{} must be a positive integer, got '{}'", name, raw)))
}
