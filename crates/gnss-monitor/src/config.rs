//! Monitor configuration from environment.

use gnss_core::DetectorRules;
use gnss_feed::SampleSelection;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_FEED_PATHS: &str =
    "/data/pvtSolution0.json,/data/pvtSolution1.json,/data/pvtSolution2.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub feed_base_url: String,
    pub feed_paths: Vec<String>,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub sample_selection: SampleSelection,
    pub teleport_threshold_m: f64,
    pub max_velocity_mps: f64,
    pub history_capacity: usize,
    /// Log a readout line for every accepted sample
    pub console: bool,
    /// Emit logs as JSON instead of the default text format
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    ///
    /// Missing or unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = DetectorRules::default();
        Self {
            server_port: parse_value(lookup("GNSS_MONITOR_PORT")).unwrap_or(5004),
            feed_base_url: lookup("GNSS_FEED_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            feed_paths: split_paths(
                &lookup("GNSS_FEED_PATHS").unwrap_or_else(|| DEFAULT_FEED_PATHS.to_string()),
            ),
            poll_interval_ms: parse_value(lookup("GNSS_POLL_INTERVAL_MS"))
                .filter(|ms| *ms > 0)
                .unwrap_or(1000),
            request_timeout_ms: parse_value(lookup("GNSS_REQUEST_TIMEOUT_MS"))
                .filter(|ms| *ms > 0)
                .unwrap_or(5000),
            sample_selection: parse_value(lookup("GNSS_SAMPLE_SELECTION")).unwrap_or_default(),
            teleport_threshold_m: parse_value(lookup("GNSS_TELEPORT_THRESHOLD_M"))
                .unwrap_or(defaults.teleport_threshold_m),
            max_velocity_mps: parse_value(lookup("GNSS_MAX_VELOCITY_MPS"))
                .unwrap_or(defaults.max_velocity_mps),
            history_capacity: parse_value(lookup("GNSS_HISTORY_CAPACITY"))
                .unwrap_or(defaults.history_capacity),
            console: parse_flag(lookup("GNSS_CONSOLE").as_deref()),
            log_json: lookup("GNSS_LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Detector rules derived from this configuration.
    pub fn detector_rules(&self) -> DetectorRules {
        DetectorRules {
            teleport_threshold_m: self.teleport_threshold_m,
            max_velocity_mps: self.max_velocity_mps,
            history_capacity: self.history_capacity,
            ..DetectorRules::default()
        }
        .with_poll_period(self.poll_interval())
    }
}

fn parse_value<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn split_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_split_paths() {
        assert_eq!(
            split_paths(" /a.json, ,/b.json,"),
            vec!["/a.json".to_string(), "/b.json".to_string()]
        );
        assert_eq!(split_paths(DEFAULT_FEED_PATHS).len(), 3);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>(Some(" 250 ".to_string())), Some(250));
        assert_eq!(parse_value::<u64>(Some("fast".to_string())), None);
        assert_eq!(parse_value::<u64>(Some(String::new())), None);
        assert_eq!(parse_value::<u64>(None), None);
        assert_eq!(parse_value::<f64>(Some("750.5".to_string())), Some(750.5));
        assert_eq!(
            parse_value::<SampleSelection>(Some("LATEST".to_string())),
            Some(SampleSelection::Latest)
        );
        assert_eq!(parse_value::<SampleSelection>(Some("newest".to_string())), None);
    }

    #[test]
    fn test_parse_flag() {
        for on in ["1", "true", " YES ", "on"] {
            assert!(parse_flag(Some(on)), "{on} should enable");
        }
        for off in ["0", "false", "", "maybe"] {
            assert!(!parse_flag(Some(off)), "{off} should not enable");
        }
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.server_port, 5004);
        assert_eq!(config.feed_base_url, "http://localhost:3000");
        assert_eq!(config.feed_paths.len(), 3);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.sample_selection, SampleSelection::Random);
        assert_eq!(config.teleport_threshold_m, 500.0);
        assert_eq!(config.max_velocity_mps, 200.0);
        assert_eq!(config.history_capacity, 51);
        assert!(!config.console);
        assert!(!config.log_json);
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("GNSS_MONITOR_PORT", "port"),
            ("GNSS_POLL_INTERVAL_MS", "soon"),
            ("GNSS_REQUEST_TIMEOUT_MS", ""),
            ("GNSS_SAMPLE_SELECTION", "newest"),
            ("GNSS_TELEPORT_THRESHOLD_M", "far"),
            ("GNSS_HISTORY_CAPACITY", "-3"),
            ("GNSS_CONSOLE", "maybe"),
        ]);
        assert_eq!(config.server_port, 5004);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.sample_selection, SampleSelection::Random);
        assert_eq!(config.teleport_threshold_m, 500.0);
        assert_eq!(config.history_capacity, 51);
        assert!(!config.console);
    }

    #[test]
    fn test_zero_durations_fall_back_to_defaults() {
        let config = config_from(&[
            ("GNSS_POLL_INTERVAL_MS", "0"),
            ("GNSS_REQUEST_TIMEOUT_MS", "0"),
        ]);
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.request_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_valid_values_are_used() {
        let config = config_from(&[
            ("GNSS_MONITOR_PORT", "8080"),
            ("GNSS_FEED_PATHS", "/pvt.json"),
            ("GNSS_POLL_INTERVAL_MS", "250"),
            ("GNSS_REQUEST_TIMEOUT_MS", "750"),
            ("GNSS_SAMPLE_SELECTION", "latest"),
            ("GNSS_CONSOLE", "true"),
            ("GNSS_LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.feed_paths, vec!["/pvt.json".to_string()]);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.request_timeout_ms, 750);
        assert_eq!(config.sample_selection, SampleSelection::Latest);
        assert!(config.console);
        assert!(config.log_json);
    }

    #[test]
    fn test_detector_rules_follow_poll_interval() {
        let config = config_from(&[
            ("GNSS_POLL_INTERVAL_MS", "2000"),
            ("GNSS_TELEPORT_THRESHOLD_M", "750"),
        ]);

        let rules = config.detector_rules();
        assert_eq!(rules.poll_period_secs, 2.0);
        assert_eq!(rules.teleport_threshold_m, 750.0);
    }
}
