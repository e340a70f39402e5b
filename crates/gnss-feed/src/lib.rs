//! GNSS Feed - upstream PVT solution polling
//!
//! Fetches JSON from a rotating set of endpoints and resolves each body to
//! a single raw sample for the detector.

pub mod client;
pub mod error;
pub mod payload;

pub use client::FeedClient;
pub use error::FeedError;
pub use payload::{resolve_payload, SampleSelection};
