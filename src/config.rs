//! Runtime configuration

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BridgeError, Result};

/// Webhook path traces are served on unless configured otherwise.
pub const DEFAULT_TRACES_URL_PATH: &str = "/v0.1/traces";
/// Collector endpoint used when none is configured.
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4318";

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9286";
const DEFAULT_OTLP_TIMEOUT_SECONDS: u64 = 10;

/// Upper bound on the ref allow-list; a list this long is almost certainly
/// a generated config that should filter upstream instead.
const MAX_CONFIGURED_REFS: usize = 50;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BridgeConfig {
    pub bind_address: String,
    pub traces: TracesConfig,
    pub otlp: OtlpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TracesConfig {
    /// Path GitLab delivers webhooks to.
    pub url_path: String,
    /// Refs worth exporting; empty means all of them.
    pub refs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OtlpConfig {
    /// Collector base URL; `/v1/traces` is appended for the export call.
    pub endpoint: String,
    /// Extra headers for every export request, e.g. an authorization token.
    pub headers: HashMap<String, String>,
    pub timeout_seconds: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            traces: TracesConfig::default(),
            otlp: OtlpConfig::default(),
        }
    }
}

impl Default for TracesConfig {
    fn default() -> Self {
        Self {
            url_path: DEFAULT_TRACES_URL_PATH.to_string(),
            refs: Vec::new(),
        }
    }
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            headers: HashMap::new(),
            timeout_seconds: DEFAULT_OTLP_TIMEOUT_SECONDS,
        }
    }
}

impl BridgeConfig {
    /// Loads the TOML file at `path`; a missing file means built-in defaults,
    /// an unreadable or invalid one is an error.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let mut config: BridgeConfig = toml::from_str(&raw)?;
        config.traces.url_path = sanitize_url_path(&config.traces.url_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the receiver cannot serve.
    pub fn validate(&self) -> Result<()> {
        if self.traces.refs.len() > MAX_CONFIGURED_REFS {
            return Err(BridgeError::ConfigError(format!(
                "{} refs configured, the maximum is {MAX_CONFIGURED_REFS}",
                self.traces.refs.len()
            )));
        }
        Ok(())
    }
}

/// Normalizes a configured webhook path: query and fragment are dropped and
/// a leading slash is added when missing.
pub fn sanitize_url_path(raw: &str) -> Result<String> {
    if raw.contains(|c: char| c.is_whitespace() || c.is_control()) {
        return Err(BridgeError::ConfigError(format!(
            "invalid HTTP URL path: {raw:?}"
        )));
    }
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    if path.starts_with('/') {
        Ok(path.to_string())
    } else {
        Ok(format!("/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:9286");
        assert_eq!(config.traces.url_path, "/v0.1/traces");
        assert!(config.traces.refs.is_empty());
        assert_eq!(config.otlp.endpoint, "http://localhost:4318");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = BridgeConfig::load("definitely/not/a/real/path.toml").unwrap();
        assert_eq!(config.traces.url_path, DEFAULT_TRACES_URL_PATH);
    }

    #[test]
    fn test_load_parses_and_sanitizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge_config.toml");
        fs::write(
            &path,
            r#"
bind_address = "0.0.0.0:9286"

[traces]
url_path = "/hooks/gitlab?token=abc"
refs = ["main", "release"]

[otlp]
endpoint = "http://collector:4318"
timeout_seconds = 5

[otlp.headers]
authorization = "Bearer secret"
"#,
        )
        .unwrap();

        let config = BridgeConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9286");
        assert_eq!(config.traces.url_path, "/hooks/gitlab");
        assert_eq!(config.traces.refs, vec!["main", "release"]);
        assert_eq!(config.otlp.timeout_seconds, 5);
        assert_eq!(
            config.otlp.headers.get("authorization").map(String::as_str),
            Some("Bearer secret")
        );
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge_config.toml");
        fs::write(&path, "refs = [unclosed").unwrap();
        assert!(BridgeConfig::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_caps_refs() {
        let mut config = BridgeConfig::default();
        config.traces.refs = (0..51).map(|i| format!("branch-{i}")).collect();
        assert!(config.validate().is_err());

        config.traces.refs.truncate(50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sanitize_url_path() {
        assert_eq!(sanitize_url_path("/xyz?someParams").unwrap(), "/xyz");
        assert_eq!(sanitize_url_path("xyz").unwrap(), "/xyz");
        assert_eq!(sanitize_url_path("/checkItOut").unwrap(), "/checkItOut");
        assert_eq!(sanitize_url_path("/deep/path#frag").unwrap(), "/deep/path");
        assert_eq!(sanitize_url_path("").unwrap(), "/");
        assert!(sanitize_url_path("/with space").is_err());
    }
}
