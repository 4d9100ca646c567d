//! Flightstat Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared record model, error handling, and logging for the flightstat workspace.
//!
//! # Overview
//!
//! - **Record Model**: the five-field flight record and its clean/dirty predicate
//! - **Error Handling**: the error taxonomy shared by ingestion and aggregation
//! - **Logging**: `tracing` subscriber setup for binaries
//!
//! # Example
//!
//! ```no_run
//! use flightstat_common::record::RawFlightRecord;
//!
//! let value = serde_json::json!({
//!     "date": "2023-04-01",
//!     "origin_city": "Boston",
//!     "destination_city": "Denver",
//!     "flight_duration_secs": 9000,
//!     "passengers_on_board": null,
//! });
//! let record = RawFlightRecord::from_value(&value).unwrap();
//! assert!(record.is_dirty());
//! ```

pub mod error;
pub mod logging;
pub mod record;

// Re-export commonly used types
pub use error::{FlightError, Result};
pub use record::{FlightRecord, RawFlightRecord};
