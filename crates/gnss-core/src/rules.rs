//! Detection thresholds for the spoof detector.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for anomaly rules and history retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorRules {
    /// Jump between consecutive fixes above which a teleport is flagged (meters)
    pub teleport_threshold_m: f64,
    /// Derived speed above which motion is flagged as impossible (m/s)
    pub max_velocity_mps: f64,
    /// Number of history entries retained (oldest evicted first)
    pub history_capacity: usize,
    /// Interval between consecutive samples, used to turn distance into velocity
    pub poll_period_secs: f64,
}

impl Default for DetectorRules {
    fn default() -> Self {
        Self {
            teleport_threshold_m: 500.0,
            max_velocity_mps: 200.0,
            history_capacity: 51,
            poll_period_secs: 1.0,
        }
    }
}

impl DetectorRules {
    /// Set the poll period from a tick interval.
    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period_secs = period.as_secs_f64();
        self
    }

    /// Convert the distance covered in one poll period into m/s.
    ///
    /// A non-positive period falls back to one second.
    pub fn velocity_for(&self, distance_m: f64) -> f64 {
        if self.poll_period_secs > 0.0 {
            distance_m / self.poll_period_secs
        } else {
            distance_m
        }
    }

    /// Evaluate both anomaly rules, teleport first.
    pub fn evaluate(&self, distance_m: f64, velocity_mps: f64) -> Vec<String> {
        let mut flags = Vec::new();
        if distance_m > self.teleport_threshold_m {
            flags.push(format!("Teleport detected ({:.1} m)", distance_m));
        }
        if velocity_mps > self.max_velocity_mps {
            flags.push(format!("Impossible velocity ({:.1} m/s)", velocity_mps));
        }
        flags
    }
}
