//! Core data models for GNSS monitoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Rejection;

const LATITUDE_ALIASES: &[&str] = &["lat", "latitude"];
const LONGITUDE_ALIASES: &[&str] = &["lon", "longitude"];
const ALTITUDE_ALIASES: &[&str] = &["alt", "height"];
const VELOCITY_ALIASES: &[&str] = &["vel_mps", "speed"];
const FIX_QUALITY_ALIASES: &[&str] = &["fix_quality", "fix"];
const SATELLITE_COUNT_ALIASES: &[&str] = &["sat_count", "sats"];
const SPOOF_FLAG_ALIASES: &[&str] = &["spoof_flags"];

/// One normalized position reading from the upstream PVT feed.
///
/// Optional quantities stay `None` when the upstream record omits them;
/// they are never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude_m: Option<f64>,
    /// Velocity as reported by the receiver, not derived locally
    #[serde(default)]
    pub reported_velocity_mps: Option<f64>,
    #[serde(default)]
    pub fix_quality: Option<String>,
    #[serde(default)]
    pub satellite_count: Option<u32>,
    /// Spoof flags raised upstream
    #[serde(default)]
    pub raw_spoof_flags: Vec<String>,
}

impl PositionSample {
    /// Create a sample with only a position.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_m: None,
            reported_velocity_mps: None,
            fix_quality: None,
            satellite_count: None,
            raw_spoof_flags: Vec::new(),
        }
    }

    /// Set altitude in meters.
    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }

    /// Normalize a loosely-structured upstream record.
    ///
    /// Each quantity may arrive under either of two names; the first one
    /// present with a non-null value is used, even if it turns out invalid.
    pub fn from_value(raw: &Value) -> Result<Self, Rejection> {
        let record = raw
            .as_object()
            .ok_or_else(|| Rejection::NotARecord(type_name(raw).to_string()))?;

        let latitude = required_coordinate(record, LATITUDE_ALIASES, "latitude")?;
        let longitude = required_coordinate(record, LONGITUDE_ALIASES, "longitude")?;

        Ok(Self {
            latitude,
            longitude,
            altitude_m: first_present(record, ALTITUDE_ALIASES).and_then(finite_number),
            reported_velocity_mps: first_present(record, VELOCITY_ALIASES)
                .and_then(finite_number),
            fix_quality: first_present(record, FIX_QUALITY_ALIASES).and_then(label),
            satellite_count: first_present(record, SATELLITE_COUNT_ALIASES).and_then(count),
            raw_spoof_flags: first_present(record, SPOOF_FLAG_ALIASES)
                .map(flag_list)
                .unwrap_or_default(),
        })
    }
}

/// A retained, timestamped position in the detector history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local wall-clock capture time (HH:MM:SS)
    pub timestamp: String,
    pub captured_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_km: Option<f64>,
}

/// Output of one detection cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedReading {
    #[serde(flatten)]
    pub sample: PositionSample,
    /// Derived from the two most recent history entries; `None` on the first fix
    pub velocity_mps: Option<f64>,
    pub anomaly_flags: Vec<String>,
    pub captured_at: DateTime<Utc>,
}

impl DerivedReading {
    pub fn is_anomalous(&self) -> bool {
        !self.anomaly_flags.is_empty()
    }
}

fn first_present<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .find(|value| !value.is_null())
}

fn required_coordinate(
    record: &Map<String, Value>,
    aliases: &[&str],
    field: &'static str,
) -> Result<f64, Rejection> {
    let value = first_present(record, aliases).ok_or(Rejection::missing(field))?;
    finite_number(value).ok_or_else(|| Rejection::non_numeric(field, value.to_string()))
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return None;
    }
    Some(n as u32)
}

fn flag_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
