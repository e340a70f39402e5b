//! Feed transport errors.

use thiserror::Error;

/// Failures while fetching or unwrapping an upstream body.
///
/// All of these skip the current tick; none of them are fatal.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no feed endpoints configured")]
    NoEndpoints,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint} returned a non-JSON body: {source}")]
    NotJson {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} returned no samples")]
    EmptyPayload { endpoint: String },
}

impl FeedError {
    /// Endpoint involved, when the error came from a request.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::NotJson { endpoint, .. }
            | Self::EmptyPayload { endpoint } => Some(endpoint),
            Self::NoEndpoints | Self::Client(_) => None,
        }
    }
}
