//! Runtime configuration for the workbench core.
//!
//! # Responsibility
//! - Hold every tunable constant (caps, delays, failure rate, map defaults).
//! - Load overrides from a JSON document and validate them before use.
//!
//! # Invariants
//! - A validated config always has non-zero caps and tick periods.
//! - `latency_min_ms <= latency_max_ms` and `failure_rate` lies in `[0, 1]`.

use crate::model::plant::GeoPoint;
use crate::status::level::LogLevel;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Default map viewport used when no record is focused.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeoDefaults {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl Default for GeoDefaults {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(38.9637, 35.2433),
            zoom: 6,
        }
    }
}

/// Core configuration. Missing JSON fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Number of generated records, not counting the sentinel.
    pub dataset_size: usize,
    /// Cap shared by the query service and the local pipeline.
    pub max_results: usize,
    pub debounce_ms: u64,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    /// Probability of a simulated server error per query.
    pub failure_rate: f64,
    pub max_log_entries: usize,
    pub max_error_queue: usize,
    /// Minimum level mirrored to the `log` facade.
    pub log_threshold: LogLevel,
    pub loader_tick_ms: u64,
    pub analysis_duration_ms: u64,
    pub analysis_tick_ms: u64,
    pub map: GeoDefaults,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            dataset_size: 200,
            max_results: 20,
            debounce_ms: 350,
            latency_min_ms: 200,
            latency_max_ms: 1000,
            failure_rate: 0.05,
            max_log_entries: 1000,
            max_error_queue: 50,
            log_threshold: LogLevel::Debug,
            loader_tick_ms: 50,
            analysis_duration_ms: 4000,
            analysis_tick_ms: 50,
            map: GeoDefaults::default(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            source: err,
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::Invalid("max_results must be > 0".to_string()));
        }
        if self.max_log_entries == 0 || self.max_error_queue == 0 {
            return Err(ConfigError::Invalid(
                "log and error queue capacities must be > 0".to_string(),
            ));
        }
        if self.max_error_queue >= self.max_log_entries {
            return Err(ConfigError::Invalid(format!(
                "max_error_queue ({}) must be smaller than max_log_entries ({})",
                self.max_error_queue, self.max_log_entries
            )));
        }
        if self.latency_min_ms > self.latency_max_ms {
            return Err(ConfigError::Invalid(format!(
                "latency range is inverted: {}..{}",
                self.latency_min_ms, self.latency_max_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "failure_rate must be within [0, 1], got {}",
                self.failure_rate
            )));
        }
        if self.loader_tick_ms == 0 || self.analysis_tick_ms == 0 || self.analysis_duration_ms == 0
        {
            return Err(ConfigError::Invalid(
                "timer periods must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn loader_tick(&self) -> Duration {
        Duration::from_millis(self.loader_tick_ms)
    }

    pub fn analysis_tick(&self) -> Duration {
        Duration::from_millis(self.analysis_tick_ms)
    }

    pub fn analysis_duration(&self) -> Duration {
        Duration::from_millis(self.analysis_duration_ms)
    }
}

/// Configuration load/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read config `{path}`: {source}"),
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::status::level::LogLevel;

    #[test]
    fn defaults_are_valid() {
        CoreConfig::default()
            .validate()
            .expect("default config should validate");
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = CoreConfig::from_json_str(r#"{ "max_results": 5, "log_threshold": "warn" }"#)
            .expect("partial config should parse");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.log_threshold, LogLevel::Warn);
        assert_eq!(config.debounce_ms, 350);
        assert_eq!(config.map.zoom, 6);
    }

    #[test]
    fn inverted_latency_is_rejected() {
        let error = CoreConfig::from_json_str(r#"{ "latency_min_ms": 900, "latency_max_ms": 100 }"#)
            .expect_err("inverted range must fail");
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn failure_rate_out_of_range_is_rejected() {
        let error = CoreConfig::from_json_str(r#"{ "failure_rate": 1.5 }"#)
            .expect_err("rate above one must fail");
        assert!(error.to_string().contains("failure_rate"));
    }

    #[test]
    fn error_queue_must_be_smaller_than_log() {
        let error = CoreConfig::from_json_str(r#"{ "max_log_entries": 50, "max_error_queue": 50 }"#)
            .expect_err("equal capacities must fail");
        assert!(error.to_string().contains("max_error_queue"));
        CoreConfig::from_json_str(r#"{ "max_log_entries": 50, "max_error_queue": 49 }"#)
            .expect("smaller queue is fine");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = CoreConfig::from_json_str("{ not json").expect_err("parse must fail");
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}
