//! Aggregation engine
//!
//! Computes the analytics over a finalized [`GlobalDataset`]:
//!
//! - **Top-N destinations** by clean-record count. Ties keep first-encounter
//!   order in the merged dataset (stable sort, count descending).
//! - **Duration statistics** for the Top-N destinations: mean and 95th
//!   percentile of per-record hours, each rounded to two decimals and returned
//!   ascending by value.
//! - **Passenger flow** summed by destination (arrivals) and by origin
//!   (departures) over every clean record. The busiest city in each direction
//!   wins ties by lexically smallest name.
//!
//! An empty dataset is an error, never a zero-filled report.

use flightstat_common::record::round2;
use flightstat_common::{FlightError, FlightRecord, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::coordinator::GlobalDataset;

pub const P95: f64 = 0.95;

/// A destination and its clean-record count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

/// A destination and a duration statistic in hours
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityHours {
    pub city: String,
    pub hours: f64,
}

/// A city and a passenger total
///
/// Totals are `u128`: each record may carry any `u64` count, so a sum of them
/// does not fit in `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityPassengers {
    pub city: String,
    pub passengers: u128,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// Ranked, most frequent first
    pub top_destinations: Vec<CityCount>,

    /// Ascending by hours
    pub avg_duration: Vec<CityHours>,

    /// Ascending by hours
    pub p95_duration: Vec<CityHours>,

    /// Passengers arrived, by city name
    pub arrivals: Vec<CityPassengers>,

    /// Passengers departed, by city name
    pub departures: Vec<CityPassengers>,

    pub max_arrival_city: String,
    pub max_departure_city: String,
}

/// Aggregate a finalized dataset.
pub fn aggregate(dataset: &GlobalDataset, top_n: usize) -> Result<AggregateReport> {
    let records = &dataset.clean_records;
    if records.is_empty() {
        return Err(FlightError::EmptyDataset);
    }
    if top_n == 0 {
        return Err(FlightError::Config("top-n must be at least 1".into()));
    }

    let top_destinations = top_destinations(records, top_n);
    let (avg_duration, p95_duration) = duration_stats(records, &top_destinations);

    let arrivals = passenger_totals(records, |r| &r.destination_city);
    let departures = passenger_totals(records, |r| &r.origin_city);

    let max_arrival_city = busiest(&arrivals).ok_or(FlightError::EmptyDataset)?;
    let max_departure_city = busiest(&departures).ok_or(FlightError::EmptyDataset)?;

    debug!(
        destinations = top_destinations.len(),
        max_arrival_city = %max_arrival_city,
        max_departure_city = %max_departure_city,
        "Aggregation complete"
    );

    Ok(AggregateReport {
        top_destinations,
        avg_duration,
        p95_duration,
        arrivals: into_city_passengers(arrivals),
        departures: into_city_passengers(departures),
        max_arrival_city,
        max_departure_city,
    })
}

/// The `n` most frequent destinations, ties in first-encounter order.
pub fn top_destinations(records: &[FlightRecord], n: usize) -> Vec<CityCount> {
    let mut ranking: Vec<CityCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let city = record.destination_city.as_str();
        match positions.get(city) {
            Some(&pos) => ranking[pos].count += 1,
            None => {
                positions.insert(city, ranking.len());
                ranking.push(CityCount {
                    city: city.to_string(),
                    count: 1,
                });
            },
        }
    }

    // sort_by is stable, so equal counts keep encounter order
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking.truncate(n);
    ranking
}

/// Mean and P95 hours for each ranked destination, both ascending by value.
fn duration_stats(
    records: &[FlightRecord],
    ranked: &[CityCount],
) -> (Vec<CityHours>, Vec<CityHours>) {
    let mut hours: HashMap<&str, Vec<f64>> = ranked
        .iter()
        .map(|c| (c.city.as_str(), Vec::with_capacity(c.count)))
        .collect();

    for record in records {
        if let Some(values) = hours.get_mut(record.destination_city.as_str()) {
            values.push(record.duration_hours());
        }
    }

    let mut avg = Vec::with_capacity(ranked.len());
    let mut p95 = Vec::with_capacity(ranked.len());

    for entry in ranked {
        let Some(values) = hours.get_mut(entry.city.as_str()) else {
            continue;
        };
        values.sort_by(f64::total_cmp);

        let (Some(avg_hours), Some(p95_hours)) = (mean(values), percentile(values, P95)) else {
            continue;
        };

        avg.push(CityHours {
            city: entry.city.clone(),
            hours: round2(avg_hours),
        });
        p95.push(CityHours {
            city: entry.city.clone(),
            hours: round2(p95_hours),
        });
    }

    // Stable, so equal values keep rank order
    avg.sort_by(|a, b| a.hours.total_cmp(&b.hours));
    p95.sort_by(|a, b| a.hours.total_cmp(&b.hours));

    (avg, p95)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile `q` of ascending `sorted`, linearly interpolated at rank `q * (n - 1)`.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

fn passenger_totals<'a>(
    records: &'a [FlightRecord],
    key: impl Fn(&'a FlightRecord) -> &'a String,
) -> BTreeMap<&'a str, u128> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(key(record).as_str()).or_insert(0) += u128::from(record.passengers_on_board);
    }
    totals
}

/// City with the highest total; the lexically smallest one on a tie.
fn busiest(totals: &BTreeMap<&str, u128>) -> Option<String> {
    let mut best: Option<(&str, u128)> = None;
    for (&city, &total) in totals {
        if best.is_none_or(|(_, max)| total > max) {
            best = Some((city, total));
        }
    }
    best.map(|(city, _)| city.to_string())
}

fn into_city_passengers(totals: BTreeMap<&str, u128>) -> Vec<CityPassengers> {
    totals
        .into_iter()
        .map(|(city, passengers)| CityPassengers {
            city: city.to_string(),
            passengers,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn flight(origin: &str, destination: &str, secs: u64, passengers: u64) -> FlightRecord {
        FlightRecord {
            date: "2023-08-19".to_string(),
            origin_city: origin.to_string(),
            destination_city: destination.to_string(),
            flight_duration_secs: secs,
            passengers_on_board: passengers,
        }
    }

    fn dataset(records: Vec<FlightRecord>) -> GlobalDataset {
        GlobalDataset {
            total_records: records.len(),
            dirty_records: 0,
            clean_records: records,
            files: Vec::new(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        assert_close(percentile(&[1.0, 2.0, 3.0, 4.0], P95).unwrap(), 3.85);
        assert_close(percentile(&[1.0, 2.0, 3.0, 4.0], 0.5).unwrap(), 2.5);
        assert_close(percentile(&[7.5], P95).unwrap(), 7.5);
        assert!(percentile(&[], P95).is_none());
    }

    #[test]
    fn test_p95_for_one_city() {
        let records = vec![
            flight("Reno", "Miami", 3600, 10),
            flight("Reno", "Miami", 7200, 10),
            flight("Reno", "Miami", 10800, 10),
            flight("Reno", "Miami", 14400, 10),
        ];

        let report = aggregate(&dataset(records), 25).unwrap();

        assert_eq!(report.p95_duration.len(), 1);
        assert_eq!(report.p95_duration[0].city, "Miami");
        assert_eq!(report.p95_duration[0].hours, 3.85);
        assert_eq!(report.avg_duration[0].hours, 2.5);
    }

    #[test]
    fn test_passenger_flow_max() {
        let records = vec![
            flight("A", "B", 3600, 100),
            flight("A", "C", 3600, 50),
            flight("D", "B", 3600, 200),
        ];

        let report = aggregate(&dataset(records), 25).unwrap();

        assert_eq!(
            report.arrivals,
            vec![
                CityPassengers { city: "B".into(), passengers: 300 },
                CityPassengers { city: "C".into(), passengers: 50 },
            ]
        );
        assert_eq!(report.max_arrival_city, "B");
        assert_eq!(report.max_departure_city, "D");
    }

    #[test]
    fn test_passenger_totals_beyond_u64() {
        let half = u64::MAX / 2 + 1;
        let records = vec![
            flight("A", "B", 3600, half),
            flight("C", "B", 3600, half),
            flight("A", "D", 3600, 5),
        ];

        let report = aggregate(&dataset(records), 25).unwrap();

        assert_eq!(
            report.arrivals,
            vec![
                CityPassengers { city: "B".into(), passengers: u128::from(u64::MAX) + 1 },
                CityPassengers { city: "D".into(), passengers: 5 },
            ]
        );
        assert_eq!(report.max_arrival_city, "B");
        assert_eq!(report.max_departure_city, "A");
    }

    #[test]
    fn test_busiest_tie_prefers_lexically_smallest() {
        let records = vec![
            flight("Tulsa", "Mesa", 3600, 40),
            flight("Austin", "Fresno", 3600, 40),
        ];

        let report = aggregate(&dataset(records), 25).unwrap();

        assert_eq!(report.max_arrival_city, "Fresno");
        assert_eq!(report.max_departure_city, "Austin");
    }

    #[test]
    fn test_top_n_ties_keep_encounter_order() {
        let records = vec![
            flight("X", "Denver", 3600, 1),
            flight("X", "Austin", 3600, 1),
            flight("X", "Boston", 3600, 1),
            flight("X", "Austin", 3600, 1),
            flight("X", "Boston", 3600, 1),
            flight("X", "Denver", 3600, 1),
            flight("X", "Omaha", 3600, 1),
            flight("X", "Boston", 3600, 1),
        ];

        let ranked = top_destinations(&records, 3);
        let cities: Vec<&str> = ranked.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(cities, vec!["Boston", "Denver", "Austin"]);
        assert_eq!(ranked[0].count, 3);

        // Stable across re-runs
        assert_eq!(top_destinations(&records, 3), ranked);
    }

    #[test]
    fn test_duration_stats_limited_to_top_n() {
        let records = vec![
            flight("X", "Boston", 7200, 1),
            flight("X", "Boston", 7200, 1),
            flight("X", "Denver", 3600, 1),
            flight("X", "Denver", 3600, 1),
            flight("X", "Omaha", 14400, 1),
        ];

        let report = aggregate(&dataset(records), 2).unwrap();

        let cities: Vec<&str> = report.avg_duration.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(cities, vec!["Denver", "Boston"]);
        assert_eq!(report.avg_duration[0].hours, 1.0);
        assert_eq!(report.avg_duration[1].hours, 2.0);

        // Passenger flow still covers every clean record
        assert!(report.arrivals.iter().any(|c| c.city == "Omaha"));
    }

    #[test]
    fn test_stats_sorted_ascending() {
        let records = vec![
            flight("X", "Slow", 14000, 1),
            flight("X", "Slow", 14000, 1),
            flight("X", "Fast", 4000, 1),
            flight("X", "Fast", 4000, 1),
            flight("X", "Medium", 9000, 1),
        ];

        let report = aggregate(&dataset(records), 25).unwrap();

        let hours: Vec<f64> = report.p95_duration.iter().map(|c| c.hours).collect();
        let mut sorted = hours.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(hours, sorted);
        assert_eq!(report.p95_duration[0].city, "Fast");
        assert_eq!(report.avg_duration.last().unwrap().city, "Slow");
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let empty = GlobalDataset {
            total_records: 4,
            dirty_records: 4,
            clean_records: Vec::new(),
            files: Vec::new(),
        };

        assert!(matches!(
            aggregate(&empty, 25),
            Err(FlightError::EmptyDataset)
        ));
    }
}
