//! Flight record model
//!
//! A record file holds a JSON list of flat objects with five fields. Any of the
//! fields may be absent, either as an explicit `null` or by omitting the key.
//! A record with at least one absent field is *dirty*; all others are *clean*
//! and convert into a [`FlightRecord`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FIELD_DATE: &str = "date";
pub const FIELD_ORIGIN_CITY: &str = "origin_city";
pub const FIELD_DESTINATION_CITY: &str = "destination_city";
pub const FIELD_DURATION_SECS: &str = "flight_duration_secs";
pub const FIELD_PASSENGERS: &str = "passengers_on_board";

const SECS_PER_HOUR: f64 = 3600.0;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A record exactly as it appeared in the file, absent fields included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlightRecord {
    pub date: Option<String>,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub flight_duration_secs: Option<u64>,
    pub passengers_on_board: Option<u64>,
}

impl RawFlightRecord {
    /// Parse one record object.
    ///
    /// The object must be flat: a nested object or array under any key is
    /// rejected. Non-null values of the five known fields must have the right
    /// type (no coercion). Unknown scalar keys are ignored.
    ///
    /// The error is a human-readable message; callers attach the file path.
    pub fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("expected a record object, found {}", kind(value)))?;

        if let Some((key, nested)) = object.iter().find(|(_, v)| v.is_object() || v.is_array()) {
            return Err(format!(
                "field '{}' holds {}, records must be flat",
                key,
                kind(nested)
            ));
        }

        Ok(Self {
            date: string_field(object, FIELD_DATE)?,
            origin_city: string_field(object, FIELD_ORIGIN_CITY)?,
            destination_city: string_field(object, FIELD_DESTINATION_CITY)?,
            flight_duration_secs: count_field(object, FIELD_DURATION_SECS)?,
            passengers_on_board: count_field(object, FIELD_PASSENGERS)?,
        })
    }

    /// Number of absent fields, each evaluated independently.
    pub fn null_field_count(&self) -> usize {
        [
            self.date.is_none(),
            self.origin_city.is_none(),
            self.destination_city.is_none(),
            self.flight_duration_secs.is_none(),
            self.passengers_on_board.is_none(),
        ]
        .into_iter()
        .filter(|absent| *absent)
        .count()
    }

    pub fn is_dirty(&self) -> bool {
        self.null_field_count() > 0
    }

    pub fn is_clean(&self) -> bool {
        !self.is_dirty()
    }

    /// Convert into a [`FlightRecord`], or `None` if any field is absent.
    pub fn into_clean(self) -> Option<FlightRecord> {
        Some(FlightRecord {
            date: self.date?,
            origin_city: self.origin_city?,
            destination_city: self.destination_city?,
            flight_duration_secs: self.flight_duration_secs?,
            passengers_on_board: self.passengers_on_board?,
        })
    }
}

/// A clean flight record. Every field is present by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightRecord {
    pub date: String,
    pub origin_city: String,
    pub destination_city: String,
    pub flight_duration_secs: u64,
    pub passengers_on_board: u64,
}

impl FlightRecord {
    /// Flight duration in hours, rounded to two decimals.
    pub fn duration_hours(&self) -> f64 {
        round2(self.flight_duration_secs as f64 / SECS_PER_HOUR)
    }
}

fn string_field(
    object: &Map<String, Value>,
    key: &str,
) -> std::result::Result<Option<String>, String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!(
            "field '{}' must be a string, found {}",
            key,
            kind(other)
        )),
    }
}

fn count_field(object: &Map<String, Value>, key: &str) -> std::result::Result<Option<u64>, String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            format!("field '{}' must be a non-negative integer, found {}", key, n)
        }),
        Some(other) => Err(format!(
            "field '{}' must be a non-negative integer, found {}",
            key,
            kind(other)
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
