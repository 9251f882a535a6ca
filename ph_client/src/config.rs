//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use portfolio_hub::ApiConfig;
use portfolio_hub::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the persisted session
pub const DEFAULT_TOKEN_FILE: &str = ".portfolio_session.json";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:8001/api`
    pub api_url: String,
    /// File holding the token store between invocations
    pub token_file: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `api_url_override` - Optional API URL override (from CLI args)
    /// * `token_file_override` - Optional session file override (from CLI args)
    /// * `timeout_override` - Optional timeout in seconds (from CLI args)
    pub fn from_env(
        api_url_override: Option<String>,
        token_file_override: Option<PathBuf>,
        timeout_override: Option<u64>,
    ) -> Self {
        let api_url = api_url_override
            .or_else(|| std::env::var("PORTFOLIO_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token_file = token_file_override
            .or_else(|| std::env::var("PORTFOLIO_TOKEN_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        let timeout_secs = timeout_override.unwrap_or_else(|| {
            parse_env_or("PORTFOLIO_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())
        });

        ClientConfig {
            api_url,
            token_file,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "PORTFOLIO_API_URL".to_string(),
                reason: format!("'{}' must start with http:// or https://", self.api_url),
            });
        }

        if self.token_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                var: "PORTFOLIO_TOKEN_FILE".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "PORTFOLIO_HTTP_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Settings for the library's HTTP client
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.trim().to_string(),
            timeout: self.timeout,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
