use std::{fmt::Display, time::Duration};
use thiserror::Error;

/// Default stock evaluation API base URL.
pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment configuration that is set but cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {name}={value:?}: {reason}")]
    InvalidVar {
        name: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid_var(name: &str, value: &str, reason: impl Display) -> Self {
        ConfigError::InvalidVar {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// [`StockClient`](crate::client::StockClient) configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalise_base_url(base_url.into()),
            ..Default::default()
        }
    }

    /// Read configuration from environment
    ///
    /// - `STOCK_API_URL`: base URL (default: [`DEFAULT_BASE_URL`])
    /// - `STOCK_API_TIMEOUT_SECS`: request timeout in whole seconds, > 0 (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("STOCK_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout = match lookup("STOCK_API_TIMEOUT_SECS") {
            Some(secs) => parse_timeout_secs(&secs)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self::new(base_url).with_request_timeout(request_timeout))
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_timeout_secs(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid_var(
            "STOCK_API_TIMEOUT_SECS",
            value,
            "timeout must be positive",
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(error) => Err(ConfigError::invalid_var("STOCK_API_TIMEOUT_SECS", value, error)),
    }
}

fn normalise_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}
