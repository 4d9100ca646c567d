//! Error types for flightstat

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flightstat operations
pub type Result<T> = std::result::Result<T, FlightError>;

/// Main error type for flightstat
///
/// Every per-file failure names the offending path. A batch that hits any of
/// them produces no dataset and no report.
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("IO error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error in '{}': {message}", .path.display())]
    Format { path: PathBuf, message: String },

    #[error("Empty dataset: no clean records to aggregate")]
    EmptyDataset,

    #[error("Worker for '{}' did not complete: {message}", .path.display())]
    Worker { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FlightError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlightError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FlightError::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The input file this error is attributed to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            FlightError::Io { path, .. }
            | FlightError::Format { path, .. }
            | FlightError::Worker { path, .. } => Some(path),
            FlightError::EmptyDataset | FlightError::Config(_) => None,
        }
    }
}
