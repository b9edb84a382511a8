//! Dispatcher configuration.
//!
//! Values come from three layers, later layers overriding earlier ones:
//! 1. Defaults
//! 2. A JSON document (`BatchConfig::from_json`)
//! 3. Environment variables (`BatchConfig::with_env_overrides`)

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`BatchConfig::endpoint`].
pub const ENDPOINT_ENV: &str = "BATCH_ENDPOINT";

/// Environment variable overriding [`BatchConfig::decode_json_responses`].
pub const DECODE_JSON_ENV: &str = "BATCH_DECODE_JSON_RESPONSES";

/// Process-wide settings for batch dispatch.
///
/// # Examples
///
/// ```
/// use batch_dispatch::BatchConfig;
///
/// let config = BatchConfig::from_json(r#"{"endpoint": "/api/batch"}"#).unwrap();
/// assert_eq!(config.endpoint, "/api/batch");
/// assert!(!config.decode_json_responses);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BatchConfig {
    /// Path pattern of the batch endpoint itself.
    ///
    /// Used to rewrite `REQUEST_URI` for each synthesized sub-request. The
    /// value is interpreted as a regular expression.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Parse string bodies of JSON responses into structured values.
    #[serde(default)]
    pub decode_json_responses: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            decode_json_responses: false,
        }
    }
}

fn default_endpoint() -> String {
    "/batch".to_string()
}

impl BatchConfig {
    /// Loads configuration from a JSON document. Missing fields use defaults.
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Loads configuration from defaults overridden by the environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment overrides on top of this configuration.
    ///
    /// Boolean values accept `1`/`true`/`yes` (case-insensitive); anything
    /// else is treated as `false`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                self.endpoint = endpoint;
            }
        }
        if let Ok(flag) = std::env::var(DECODE_JSON_ENV) {
            self.decode_json_responses = parse_flag(&flag);
        }
        self
    }

    /// Sets the endpoint pattern.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Enables or disables JSON decoding of response bodies.
    pub fn with_decode_json_responses(mut self, enabled: bool) -> Self {
        self.decode_json_responses = enabled;
        self
    }

    /// Compiles the pattern that matches the endpoint and everything after it.
    pub(crate) fn endpoint_pattern(&self) -> Result<Regex> {
        Regex::new(&format!("{}.*", self.endpoint)).map_err(|source| Error::InvalidEndpoint {
            pattern: self.endpoint.clone(),
            source,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.endpoint, "/batch");
        assert!(!config.decode_json_responses);
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = BatchConfig::from_json(r#"{"decode_json_responses": true}"#).unwrap();
        assert_eq!(config.endpoint, "/batch");
        assert!(config.decode_json_responses);
    }

    #[test]
    fn from_json_rejects_garbage() {
        let result = BatchConfig::from_json("not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn builder_methods() {
        let config = BatchConfig::default()
            .with_endpoint("/api/batch")
            .with_decode_json_responses(true);

        assert_eq!(config.endpoint, "/api/batch");
        assert!(config.decode_json_responses);
    }

    #[test]
    fn endpoint_pattern_matches_suffix() {
        let pattern = BatchConfig::default().endpoint_pattern().unwrap();
        assert!(pattern.is_match("http://host/batch?x=1"));
        assert!(!pattern.is_match("http://host/other"));
    }

    #[test]
    fn invalid_endpoint_pattern_is_reported() {
        let result = BatchConfig::default().with_endpoint("(").endpoint_pattern();
        match result {
            Err(Error::InvalidEndpoint { pattern, .. }) => assert_eq!(pattern, "("),
            other => panic!("expected InvalidEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn flags() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
    }
}
