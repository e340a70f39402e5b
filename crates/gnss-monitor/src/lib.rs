//! GNSS Monitor - polls a PVT feed, runs spoof detection and serves the
//! results read-only to display consumers.

pub mod api;
pub mod config;
pub mod loops;
pub mod state;

pub use config::Config;
pub use state::MonitorState;
