//! Spoof detection over a bounded GNSS position history.
//!
//! Each accepted sample is compared against the previous fix. Jumps that
//! are too long (teleport) or too fast (impossible velocity) are flagged.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Rejection;
use crate::history::PositionHistory;
use crate::models::{DerivedReading, HistoryEntry, PositionSample};
use crate::rules::DetectorRules;
use crate::spatial::haversine_distance;

/// Where the detector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorState {
    /// No sample accepted yet; velocity is always unknown and no rule fires
    AwaitingFirstSample,
    /// At least one fix in history; rules are evaluated on every sample
    Tracking,
}

/// Per-session anomaly detector.
///
/// Owns its history; `ingest` is the only way to mutate it.
#[derive(Debug, Clone)]
pub struct SpoofDetector {
    rules: DetectorRules,
    history: PositionHistory,
    latest: Option<DerivedReading>,
}

impl Default for SpoofDetector {
    fn default() -> Self {
        Self::new(DetectorRules::default())
    }
}

impl SpoofDetector {
    pub fn new(rules: DetectorRules) -> Self {
        let history = PositionHistory::new(rules.history_capacity);
        Self {
            rules,
            history,
            latest: None,
        }
    }

    pub fn state(&self) -> DetectorState {
        if self.history.is_empty() {
            DetectorState::AwaitingFirstSample
        } else {
            DetectorState::Tracking
        }
    }

    /// Current reading, if any sample has been accepted.
    pub fn latest(&self) -> Option<&DerivedReading> {
        self.latest.as_ref()
    }

    /// Read-only view of the retained history.
    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Ingest one raw upstream record captured now.
    pub fn ingest(&mut self, raw: &Value) -> Result<DerivedReading, Rejection> {
        self.ingest_at(raw, Utc::now())
    }

    /// Ingest one raw upstream record captured at `captured_at`.
    ///
    /// On rejection neither history nor the current reading changes.
    pub fn ingest_at(
        &mut self,
        raw: &Value,
        captured_at: DateTime<Utc>,
    ) -> Result<DerivedReading, Rejection> {
        let sample = PositionSample::from_value(raw)?;
        Ok(self.ingest_sample(sample, captured_at))
    }

    /// Run one detection cycle on an already-normalized sample.
    pub fn ingest_sample(
        &mut self,
        sample: PositionSample,
        captured_at: DateTime<Utc>,
    ) -> DerivedReading {
        let (velocity_mps, anomaly_flags) = match self.history.latest() {
            Some(previous) => {
                let distance_m = haversine_distance(
                    previous.latitude,
                    previous.longitude,
                    sample.latitude,
                    sample.longitude,
                );
                let velocity = self.rules.velocity_for(distance_m);
                (Some(velocity), self.rules.evaluate(distance_m, velocity))
            }
            None => (None, Vec::new()),
        };

        self.history.push(HistoryEntry {
            timestamp: captured_at.with_timezone(&Local).format("%H:%M:%S").to_string(),
            captured_at,
            latitude: sample.latitude,
            longitude: sample.longitude,
            altitude_km: sample.altitude_m.map(|alt| alt / 1000.0),
        });

        let reading = DerivedReading {
            sample,
            velocity_mps,
            anomaly_flags,
            captured_at,
        };
        self.latest = Some(reading.clone());
        reading
    }
}
