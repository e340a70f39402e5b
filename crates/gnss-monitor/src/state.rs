//! Shared monitor state: the detector plus tick counters.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use gnss_core::display::{altitude_series, drift_series, AltitudePoint, DriftPoint};
use gnss_core::{
    DerivedReading, DetectorRules, DetectorState, HistoryEntry, Rejection, SpoofDetector,
};
use gnss_feed::FeedError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fetch outcomes for a single feed endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointStats {
    pub successes: u64,
    pub failures: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Counters exposed on the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStats {
    pub detector_state: DetectorState,
    pub accepted: u64,
    pub rejected: u64,
    pub transport_failures: u64,
    pub anomalous: u64,
    pub history_len: usize,
    pub endpoints: BTreeMap<String, EndpointStats>,
}

/// Chart series derived from the current history.
#[derive(Debug, Clone, Serialize)]
pub struct GnssSeries {
    pub drift: Vec<DriftPoint>,
    pub altitude: Vec<AltitudePoint>,
}

/// Application state - owns the detector, hands out snapshots.
pub struct MonitorState {
    detector: Mutex<SpoofDetector>,
    endpoints: DashMap<String, EndpointStats>,
    accepted: AtomicU64,
    rejected: AtomicU64,
    transport_failures: AtomicU64,
    anomalous: AtomicU64,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(DetectorRules::default())
    }
}

impl MonitorState {
    pub fn new(rules: DetectorRules) -> Self {
        Self {
            detector: Mutex::new(SpoofDetector::new(rules)),
            endpoints: DashMap::new(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            anomalous: AtomicU64::new(0),
        }
    }

    fn detector(&self) -> MutexGuard<'_, SpoofDetector> {
        // Poisoning is ignored: ingest mutates history with a single push.
        self.detector.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one raw sample from `endpoint` through the detector.
    pub fn ingest(&self, endpoint: &str, raw: &Value) -> Result<DerivedReading, Rejection> {
        self.record_fetch_success(endpoint);

        let result = self.detector().ingest(raw);
        match &result {
            Ok(reading) => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
                if reading.is_anomalous() {
                    self.anomalous.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(_) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    /// Count a failed fetch. Detector state is not touched.
    pub fn record_transport_failure(&self, err: &FeedError) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
        if let Some(endpoint) = err.endpoint() {
            let mut stats = self.endpoints.entry(endpoint.to_string()).or_default();
            stats.failures += 1;
            stats.last_error = Some(err.to_string());
        }
    }

    fn record_fetch_success(&self, endpoint: &str) {
        let mut stats = self.endpoints.entry(endpoint.to_string()).or_default();
        stats.successes += 1;
        stats.last_success = Some(Utc::now());
    }

    pub fn latest(&self) -> Option<DerivedReading> {
        self.detector().latest().cloned()
    }

    /// History snapshot, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.detector().history().snapshot()
    }

    pub fn series(&self) -> GnssSeries {
        let detector = self.detector();
        GnssSeries {
            drift: drift_series(detector.history()),
            altitude: altitude_series(detector.history()),
        }
    }

    pub fn stats(&self) -> MonitorStats {
        let (detector_state, history_len) = {
            let detector = self.detector();
            (detector.state(), detector.history().len())
        };
        MonitorStats {
            detector_state,
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            anomalous: self.anomalous.load(Ordering::Relaxed),
            history_len,
            endpoints: self
                .endpoints
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect(),
        }
    }
}
