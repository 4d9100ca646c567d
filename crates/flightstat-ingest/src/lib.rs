//! Flightstat Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Parallel ingestion and analytics for directories of per-origin-city flight
//! record files.
//!
//! # Stages
//!
//! - **Discovery**: list the record files in an input directory
//! - **Processing**: parse one file and split clean from dirty records
//! - **Coordination**: process a batch on a bounded worker pool and merge
//! - **Aggregation**: destination ranking, duration statistics, passenger flow
//! - **Reporting**: labeled series for log or JSON sinks
//!
//! # Example
//!
//! ```no_run
//! use flightstat_ingest::config::AnalyzeConfig;
//! use flightstat_ingest::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AnalyzeConfig::new().with_input_dir("./tmp/flights").with_top_n(10);
//!     let series = pipeline::run(&config).await?;
//!     println!("busiest arrival city: {}", series.max_arrival_city);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod pipeline;
pub mod processor;
pub mod report;

pub use aggregate::{aggregate, AggregateReport};
pub use config::AnalyzeConfig;
pub use coordinator::{ingest_files, GlobalDataset};
pub use processor::{process_file, FileIngestResult};
pub use report::{JsonSink, LogSink, ReportSeries, ReportSink};
