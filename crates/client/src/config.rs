//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `HANDYHUB_API_URL` - Backend base URL (default: `https://api.handyhub.in/api`)
//! - `HANDYHUB_STATE_PATH` - Durable state file (default: `.handyhub/state.json`)
//! - `HANDYHUB_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Production backend used when `HANDYHUB_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.handyhub.in/api";

/// State file used when `HANDYHUB_STATE_PATH` is unset.
pub const DEFAULT_STATE_PATH: &str = ".handyhub/state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// HandyHub client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; endpoint paths are appended to it
    pub api_url: Url,
    /// Where the cart and session are persisted
    pub state_path: PathBuf,
    /// Optional request timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = parse_api_url(
            &get("HANDYHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;

        let state_path = get("HANDYHUB_STATE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from);

        let timeout = get("HANDYHUB_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        ConfigError::InvalidEnvVar(
                            "HANDYHUB_TIMEOUT_SECS".to_string(),
                            format!("expected a positive number of seconds, got {raw:?}"),
                        )
                    })
            })
            .transpose()?;

        Ok(Self {
            api_url,
            state_path,
            timeout,
            sentry_dsn: get("SENTRY_DSN"),
        })
    }

    /// Configuration pointing at `api_url` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            timeout: None,
            sentry_dsn: None,
        })
    }
}

/// Parse and normalise the base URL so that relative joins append to its path.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("HANDYHUB_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.handyhub.in/api/");
        assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_PATH));
        assert!(config.timeout.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HANDYHUB_API_URL", "http://localhost:5000/api/v2"),
            ("HANDYHUB_STATE_PATH", "/tmp/hh.json"),
            ("HANDYHUB_TIMEOUT_SECS", "15"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api/v2/");
        assert_eq!(config.state_path, PathBuf::from("/tmp/hh.json"));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("HANDYHUB_API_URL", "not a url")]).is_err());
        assert!(config_from(&[("HANDYHUB_API_URL", "ftp://files.handyhub.in")]).is_err());
        assert!(config_from(&[("HANDYHUB_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("HANDYHUB_TIMEOUT_SECS", "0")]).is_err());
    }
}
