//! Environment-driven logging configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was present but could not be interpreted
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Plain,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                name: LogConfig::FORMAT_VAR.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive, used when `RUST_LOG` is not set
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
        }
    }
}

impl LogConfig {
    /// Variable holding the default filter directive
    pub const LEVEL_VAR: &'static str = "SQUEEZE_LOG_LEVEL";
    /// Variable selecting `plain` or `json` output
    pub const FORMAT_VAR: &'static str = "SQUEEZE_LOG_FORMAT";

    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = lookup(Self::LEVEL_VAR).filter(|l| !l.trim().is_empty()) {
            config.level = level.trim().to_string();
        }
        if let Some(format) = lookup(Self::FORMAT_VAR) {
            config.format = format.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = LogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = LogConfig::from_lookup(lookup(&[
            ("SQUEEZE_LOG_LEVEL", "squeeze_core=debug"),
            ("SQUEEZE_LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.level, "squeeze_core=debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_format() {
        let err = tokio_test::assert_err!(LogConfig::from_lookup(lookup(&[("SQUEEZE_LOG_FORMAT", "yaml")])));
        assert_eq!(
            err.to_string(),
            "Invalid value for SQUEEZE_LOG_FORMAT: yaml"
        );
    }

    #[test]
    fn test_format_serialization() {
        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }
}
