//! Gateway configuration.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default agent API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8002/api";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "APPOINTMENT_AGENT_URL";

/// Environment variable setting a request timeout in seconds.
pub const TIMEOUT_ENV: &str = "APPOINTMENT_AGENT_TIMEOUT_SECS";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Invalid timeout {0:?}: expected whole seconds")]
    InvalidTimeout(String),
    #[error("HTTP client build failed: {0}")]
    Client(String),
}

/// Where the agent lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// API root; `/chat` and `/session/{id}` are appended.
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    #[serde(with = "optional_secs")]
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl GatewayConfig {
    /// Config pointing at `base_url` with no timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set a per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read overrides from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    ///
    /// # Errors
    /// Returns error if a value is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL.
    ///
    /// # Errors
    /// Returns error describing why the URL is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    /// Join an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

mod optional_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
