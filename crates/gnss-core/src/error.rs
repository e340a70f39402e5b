//! Error types for sample normalization.

use thiserror::Error;

/// Reasons a raw sample is rejected before it reaches the detector.
///
/// A rejected sample never touches history or the current reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// The payload is not a JSON object.
    #[error("sample is not a record: {0}")]
    NotARecord(String),

    /// Neither alias of a required coordinate is present.
    #[error("missing {field}")]
    MissingCoordinate {
        /// Canonical name of the coordinate.
        field: &'static str,
    },

    /// The coordinate is present but not a finite number.
    #[error("non-numeric {field}: {value}")]
    NonNumericCoordinate {
        /// Canonical name of the coordinate.
        field: &'static str,
        /// The offending raw value, as JSON text.
        value: String,
    },
}

impl Rejection {
    /// Creates a missing-coordinate rejection.
    #[must_use]
    pub const fn missing(field: &'static str) -> Self {
        Self::MissingCoordinate { field }
    }

    /// Creates a non-numeric-coordinate rejection.
    #[must_use]
    pub fn non_numeric(field: &'static str, value: impl Into<String>) -> Self {
        Self::NonNumericCoordinate {
            field,
            value: value.into(),
        }
    }
}
