//! Configuration file parsing for the intake service.
//!
//! Loads settings from TOML files: bind address, duplicate-label policy,
//! record source options, and the scoring backend. Every key is optional.

use fluradar_domain::DuplicatePolicy;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Upper bound for `scorer.max_retries`
pub const MAX_SCORER_RETRIES: u32 = 10;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Which record component wins when a label repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateLabels {
    /// First occurrence in record order
    #[default]
    First,

    /// Last occurrence in record order
    Last,
}

impl From<DuplicateLabels> for DuplicatePolicy {
    fn from(value: DuplicateLabels) -> Self {
        match value {
            DuplicateLabels::First => DuplicatePolicy::FirstMatch,
            DuplicateLabels::Last => DuplicatePolicy::LastMatch,
        }
    }
}

/// Intake service configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8501)
    pub bind_port: u16,

    /// Duplicate-label policy for extraction
    pub duplicate_labels: DuplicateLabels,

    /// Upstream record source
    pub record_source: RecordSourceConfig,

    /// Scoring backend
    pub scorer: ScorerConfig,
}

/// Record source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordSourceConfig {
    /// Fetch timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

/// Scoring backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    /// Fixed-probability mock
    #[default]
    Mock,

    /// Remote scoring service
    Http,
}

/// Scorer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Backend to use
    pub backend: ScorerKind,

    /// Scoring endpoint URL (required for the http backend)
    pub endpoint: Option<String>,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Attempts per scoring call (default: 3)
    pub max_retries: u32,

    /// Probability returned by the mock backend
    pub mock_probability: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8501,
            duplicate_labels: DuplicateLabels::First,
            record_source: RecordSourceConfig::default(),
            scorer: ScorerConfig::default(),
        }
    }
}

impl Default for RecordSourceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: fluradar_fhir::DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            backend: ScorerKind::Mock,
            endpoint: None,
            timeout_secs: fluradar_scorer::http::DEFAULT_TIMEOUT_SECS,
            max_retries: fluradar_scorer::http::DEFAULT_MAX_RETRIES,
            mock_probability: 50.0,
        }
    }
}

impl FormConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: FormConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_source.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "record_source.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.scorer.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "scorer.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.scorer.max_retries == 0 || self.scorer.max_retries > MAX_SCORER_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "scorer.max_retries must be between 1 and {}",
                MAX_SCORER_RETRIES
            )));
        }
        if self.scorer.backend == ScorerKind::Http
            && self.scorer.endpoint.as_deref().map_or(true, |e| e.trim().is_empty())
        {
            return Err(ConfigError::MissingField("scorer.endpoint".to_string()));
        }
        if !self.scorer.mock_probability.is_finite() {
            return Err(ConfigError::Invalid(
                "scorer.mock_probability must be a finite number".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.bind_port)
        } else {
            format!("{}:{}", self.bind_address, self.bind_port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8501");
        assert_eq!(config.duplicate_labels, DuplicateLabels::First);
        assert_eq!(config.record_source.timeout_secs, 10);
        assert!(!config.record_source.accept_invalid_certs);
        assert_eq!(config.scorer.backend, ScorerKind::Mock);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ipv6_bind_addr() {
        let config = FormConfig {
            bind_address: "::1".to_string(),
            ..FormConfig::default()
        };
        assert_eq!(config.bind_addr(), "[::1]:8501");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = FormConfig::from_toml("").unwrap();
        assert_eq!(config.bind_port, 8501);
        assert_eq!(config.scorer.max_retries, 3);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            duplicate_labels = "last"

            [record_source]
            timeout_secs = 5
            accept_invalid_certs = true

            [scorer]
            backend = "http"
            endpoint = "http://scoring.internal/predict"
            max_retries = 2
        "#;

        let config = FormConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(DuplicatePolicy::from(config.duplicate_labels), DuplicatePolicy::LastMatch);
        assert_eq!(config.record_source.timeout_secs, 5);
        assert!(config.record_source.accept_invalid_certs);
        assert_eq!(config.scorer.backend, ScorerKind::Http);
        assert_eq!(config.scorer.max_retries, 2);
        assert_eq!(config.scorer.timeout_secs, 30);
    }

    #[test]
    fn test_http_backend_requires_endpoint() {
        let toml = r#"
            [scorer]
            backend = "http"
        "#;
        let result = FormConfig::from_toml(toml);
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = r#"
            [record_source]
            timeout_secs = 0
        "#;
        let result = FormConfig::from_toml(toml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_max_retries_bounded() {
        let ok = FormConfig::from_toml("[scorer]\nmax_retries = 10\n");
        assert!(ok.is_ok());

        let too_many = FormConfig::from_toml("[scorer]\nmax_retries = 65\n");
        assert!(matches!(too_many, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_duplicate_policy_rejected() {
        let result = FormConfig::from_toml(r#"duplicate_labels = "random""#);
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fluradar.toml");
        std::fs::write(&path, "bind_port = 8600\n").unwrap();

        let config = FormConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_port, 8600);
    }

    #[test]
    fn test_missing_file() {
        let result = FormConfig::from_file("/nonexistent/fluradar.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
