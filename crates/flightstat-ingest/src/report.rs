//! Report series handed to reporting sinks
//!
//! The pipeline produces plain labeled series. Turning them into charts is the
//! consumer's business; the sinks here only log them or serialize them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tracing::info;

use crate::aggregate::{AggregateReport, CityCount, CityHours, CityPassengers};
use crate::coordinator::GlobalDataset;

/// Everything a report consumer needs, ready to serialize
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSeries {
    pub generated_at: DateTime<Utc>,
    pub processing_secs: f64,

    pub total_records: usize,
    pub dirty_records: usize,

    /// Dirty records per input file
    pub null_counts: Vec<usize>,
    /// Clean records per input file, same index as `null_counts`
    pub clean_counts: Vec<usize>,

    pub top_destinations: Vec<CityCount>,
    pub top_destinations_avg_duration: Vec<CityHours>,
    pub top_destinations_p95_duration: Vec<CityHours>,

    pub passengers_arrived: Vec<CityPassengers>,
    pub passengers_departed: Vec<CityPassengers>,
    pub max_arrival_city: String,
    pub max_departure_city: String,
}

impl ReportSeries {
    pub fn new(dataset: &GlobalDataset, report: AggregateReport, elapsed: Duration) -> Self {
        Self {
            generated_at: Utc::now(),
            processing_secs: elapsed.as_secs_f64(),
            total_records: dataset.total_records,
            dirty_records: dataset.dirty_records,
            null_counts: dataset.null_counts(),
            clean_counts: dataset.clean_counts(),
            top_destinations: report.top_destinations,
            top_destinations_avg_duration: report.avg_duration,
            top_destinations_p95_duration: report.p95_duration,
            passengers_arrived: report.arrivals,
            passengers_departed: report.departures,
            max_arrival_city: report.max_arrival_city,
            max_departure_city: report.max_departure_city,
        }
    }
}

/// Consumer of a finished report
pub trait ReportSink {
    fn emit(&mut self, series: &ReportSeries) -> Result<()>;
}

/// Logs the headline numbers as structured events
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&mut self, series: &ReportSeries) -> Result<()> {
        info!(
            total_records = series.total_records,
            dirty_records = series.dirty_records,
            files = series.null_counts.len(),
            processing_secs = series.processing_secs,
            "Records processed"
        );
        info!(
            max_arrival_city = %series.max_arrival_city,
            max_departure_city = %series.max_departure_city,
            "Passenger flow"
        );
        for entry in &series.top_destinations_p95_duration {
            info!(city = %entry.city, hours = entry.hours, "P95 duration");
        }
        Ok(())
    }
}

/// Writes the series as pretty-printed JSON
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn emit(&mut self, series: &ReportSeries) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, series)
            .context("Failed to serialize report")?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().context("Failed to flush report output")?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::processor::FileIngestResult;
    use flightstat_common::FlightRecord;
    use std::path::PathBuf;

    fn sample_dataset() -> GlobalDataset {
        let record = |origin: &str, destination: &str, passengers| FlightRecord {
            date: "2023-11-02".to_string(),
            origin_city: origin.to_string(),
            destination_city: destination.to_string(),
            flight_duration_secs: 5400,
            passengers_on_board: passengers,
        };

        GlobalDataset::from_results(vec![
            FileIngestResult {
                path: PathBuf::from("Boise.json"),
                total_count: 3,
                dirty_count: 1,
                clean_records: vec![record("Boise", "Reno", 90), record("Boise", "Mesa", 20)],
            },
            FileIngestResult {
                path: PathBuf::from("Mesa.json"),
                total_count: 1,
                dirty_count: 0,
                clean_records: vec![record("Mesa", "Reno", 60)],
            },
        ])
    }

    #[test]
    fn test_series_from_dataset() {
        let dataset = sample_dataset();
        let report = aggregate(&dataset, 25).unwrap();
        let series = ReportSeries::new(&dataset, report, Duration::from_millis(1500));

        assert_eq!(series.total_records, 4);
        assert_eq!(series.dirty_records, 1);
        assert_eq!(series.null_counts, vec![1, 0]);
        assert_eq!(series.clean_counts, vec![2, 1]);
        assert_eq!(series.max_arrival_city, "Reno");
        assert_eq!(series.max_departure_city, "Boise");
        assert_eq!(series.processing_secs, 1.5);
    }

    #[test]
    fn test_json_sink_writes_series() {
        let dataset = sample_dataset();
        let report = aggregate(&dataset, 25).unwrap();
        let series = ReportSeries::new(&dataset, report, Duration::from_secs(2));

        let mut sink = JsonSink::new(Vec::new());
        sink.emit(&series).unwrap();
        let output = sink.into_inner();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["total_records"], 4);
        assert_eq!(parsed["max_arrival_city"], "Reno");
        assert_eq!(parsed["top_destinations_avg_duration"][0]["hours"], 1.5);
        assert_eq!(parsed["null_counts"], serde_json::json!([1, 0]));
    }

    #[test]
    fn test_log_sink_accepts_series() {
        let dataset = sample_dataset();
        let report = aggregate(&dataset, 25).unwrap();
        let series = ReportSeries::new(&dataset, report, Duration::ZERO);

        assert!(LogSink.emit(&series).is_ok());
    }
}
