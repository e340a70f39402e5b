//! Text formatting for the GNSS console readout and chart series.

use serde::Serialize;

use crate::history::PositionHistory;
use crate::models::DerivedReading;

/// Placeholder shown for unknown values.
pub const UNKNOWN: &str = "—";

/// Message shown when a reading carries no anomaly flags.
pub const NO_ANOMALIES: &str = "No anomalies detected";

/// One labelled cell of the telemetry grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readout {
    pub label: &'static str,
    pub value: String,
}

/// One point of the position drift chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftPoint {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One bar of the altitude distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltitudePoint {
    pub timestamp: String,
    pub altitude_km: f64,
}

/// Fixed-point formatting with a placeholder for unknown values.
pub fn format_fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => UNKNOWN.to_string(),
    }
}

fn format_label<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

/// Telemetry grid for a reading. Coordinates at 5 decimals, the rest at 1.
pub fn readouts(reading: &DerivedReading) -> Vec<Readout> {
    let sample = &reading.sample;
    vec![
        Readout {
            label: "Latitude",
            value: format_fixed(Some(sample.latitude), 5),
        },
        Readout {
            label: "Longitude",
            value: format_fixed(Some(sample.longitude), 5),
        },
        Readout {
            label: "Altitude (m)",
            value: format_fixed(sample.altitude_m, 1),
        },
        Readout {
            label: "Velocity (m/s)",
            value: format_fixed(reading.velocity_mps, 1),
        },
        Readout {
            label: "Reported velocity (m/s)",
            value: format_fixed(sample.reported_velocity_mps, 1),
        },
        Readout {
            label: "Fix Quality",
            value: format_label(sample.fix_quality.as_deref()),
        },
        Readout {
            label: "Sat Count",
            value: format_label(sample.satellite_count),
        },
    ]
}

/// Anomaly section: one line per flag, or the all-clear message.
pub fn flag_summary(flags: &[String]) -> Vec<String> {
    if flags.is_empty() {
        vec![NO_ANOMALIES.to_string()]
    } else {
        flags.to_vec()
    }
}

/// Single-line rendering used by the console log.
pub fn render_line(reading: &DerivedReading) -> String {
    let grid = readouts(reading)
        .into_iter()
        .map(|r| format!("{}={}", r.label, r.value))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{} || {}", grid, flag_summary(&reading.anomaly_flags).join("; "))
}

pub fn drift_series(history: &PositionHistory) -> Vec<DriftPoint> {
    history
        .iter()
        .map(|entry| DriftPoint {
            timestamp: entry.timestamp.clone(),
            latitude: entry.latitude,
            longitude: entry.longitude,
        })
        .collect()
}

/// Only entries with a known altitude.
pub fn altitude_series(history: &PositionHistory) -> Vec<AltitudePoint> {
    history
        .iter()
        .filter_map(|entry| {
            entry.altitude_km.map(|altitude_km| AltitudePoint {
                timestamp: entry.timestamp.clone(),
                altitude_km,
            })
        })
        .collect()
}
