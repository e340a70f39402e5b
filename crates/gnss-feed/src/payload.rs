//! Envelope unwrapping and per-tick sample selection.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How one sample is picked when a body carries several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSelection {
    /// Uniformly random element
    #[default]
    Random,
    /// Last element of the array
    Latest,
}

impl FromStr for SampleSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "latest" => Ok(Self::Latest),
            other => Err(format!("unknown sample selection '{}'", other)),
        }
    }
}

impl fmt::Display for SampleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Latest => f.write_str("latest"),
        }
    }
}

/// Resolve a response body to one raw sample.
///
/// The body is either a bare record or `{ "data": record | [record] }`.
/// A null or missing `data` falls back to the body itself. Returns `None`
/// for an empty array.
pub fn resolve_payload(body: Value, selection: SampleSelection) -> Option<Value> {
    let raw = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            _ => Value::Object(map),
        },
        other => other,
    };

    match raw {
        Value::Array(mut items) => {
            if items.is_empty() {
                return None;
            }
            let index = match selection {
                SampleSelection::Random => rand::rng().random_range(0..items.len()),
                SampleSelection::Latest => items.len() - 1,
            };
            Some(items.swap_remove(index))
        }
        other => Some(other),
    }
}
