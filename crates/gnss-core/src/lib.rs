//! GNSS Core - sample normalization and spoof detection
//!
//! Turns loosely-structured PVT records into typed samples, keeps a bounded
//! position history and flags teleports and impossible velocities.

pub mod detector;
pub mod display;
pub mod error;
pub mod history;
pub mod models;
pub mod rules;
pub mod spatial;

pub use detector::{DetectorState, SpoofDetector};
pub use error::Rejection;
pub use history::PositionHistory;
pub use models::{DerivedReading, HistoryEntry, PositionSample};
pub use rules::DetectorRules;
pub use spatial::haversine_distance;
