//! Bridge configuration
//!
//! Vendor endpoints, protocol constants and the request deadline. Every field
//! has a production default and can be overridden from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upper bound applied to configured timeouts, one day.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Runtime configuration shared by all wire adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub google_base_url: String,
    /// Value of the `anthropic-version` header.
    pub anthropic_version: String,
    /// Output cap sent to vendors that require one when the caller gave none.
    pub default_max_output_tokens: u32,
    /// Ceiling on the whole request: connect, headers and body.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            google_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            default_max_output_tokens: 4096,
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `CHATBRIDGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `CHATBRIDGE_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("CHATBRIDGE_OPENAI_BASE_URL") {
            config = config.with_openai_base_url(url);
        }
        if let Some(url) = lookup("CHATBRIDGE_ANTHROPIC_BASE_URL") {
            config = config.with_anthropic_base_url(url);
        }
        if let Some(url) = lookup("CHATBRIDGE_GOOGLE_BASE_URL") {
            config = config.with_google_base_url(url);
        }
        if let Some(version) = lookup("CHATBRIDGE_ANTHROPIC_VERSION") {
            config.anthropic_version = version;
        }
        if let Some(tokens) = parse_override(&lookup, "CHATBRIDGE_DEFAULT_MAX_OUTPUT_TOKENS") {
            config.default_max_output_tokens = tokens;
        }
        if let Some(secs) = parse_override(&lookup, "CHATBRIDGE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs;
        }
        if let Some(secs) = parse_override(&lookup, "CHATBRIDGE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = secs;
        }
        config
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = trim_base_url(url.into());
        self
    }

    pub fn with_anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.anthropic_base_url = trim_base_url(url.into());
        self
    }

    pub fn with_google_base_url(mut self, url: impl Into<String>) -> Self {
        self.google_base_url = trim_base_url(url.into());
        self
    }

    pub fn with_default_max_output_tokens(mut self, tokens: u32) -> Self {
        self.default_max_output_tokens = tokens;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Request deadline, clamped to `1..=MAX_TIMEOUT_SECS` seconds.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.clamp(1, MAX_TIMEOUT_SECS))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.clamp(1, MAX_TIMEOUT_SECS))
    }
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable configuration override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_public_endpoints() {
        let config = BridgeConfig::default();
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.default_max_output_tokens, 4096);
    }

    #[test]
    fn lookup_overrides_and_trims() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CHATBRIDGE_OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("CHATBRIDGE_REQUEST_TIMEOUT_SECS", "15"),
            ("CHATBRIDGE_DEFAULT_MAX_OUTPUT_TOKENS", "not-a-number"),
        ]);
        let config = BridgeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.openai_base_url, "http://localhost:9000/v1");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.default_max_output_tokens, 4096);
        assert_eq!(config.google_base_url, DEFAULT_GOOGLE_BASE_URL);
    }

    #[test]
    fn out_of_range_timeouts_are_clamped() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CHATBRIDGE_REQUEST_TIMEOUT_SECS", "18446744073709551615"),
            ("CHATBRIDGE_CONNECT_TIMEOUT_SECS", "0"),
        ]);
        let config = BridgeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.request_timeout(), Duration::from_secs(MAX_TIMEOUT_SECS));
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert!(tokio::time::Instant::now().checked_add(config.request_timeout()).is_some());
    }

    #[test]
    fn partial_serde_input_keeps_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"request_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.anthropic_version, DEFAULT_ANTHROPIC_VERSION);
    }
}
