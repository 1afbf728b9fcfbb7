//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BACKEND_BASE_URL` - Backend API base URL (default: `http://localhost:5000`)
//! - `BACKEND_API_TOKEN` - Bearer token sent to the backend
//! - `CHECKOUT_VERIFICATION_CODE` - Accepted guest verification code (default: 1234)
//! - `ORDER_SIMULATED_DELAY_MS` - Delay of the simulated order gateway (default: 2000)
//! - `ORDER_REDIRECT_DELAY_SECS` - Wait before redirecting to order tracking (default: 3)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub backend: BackendConfig,
    /// Code a guest must enter to verify their phone
    pub verification_code: String,
    /// Processing time of the simulated order gateway
    pub simulated_order_delay: Duration,
    /// Wait on the confirmation step before redirecting
    pub redirect_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub api_token: Option<SecretString>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl BackendConfig {
    /// Configuration for a backend at `base_url`, without a token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
        }
    }

    /// Absolute URL of `path` on the backend.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_url("BACKEND_BASE_URL", &get("BACKEND_BASE_URL", DEFAULT_BACKEND_URL))?;
        let api_token = lookup("BACKEND_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let verification_code = get("CHECKOUT_VERIFICATION_CODE", "1234");
        if verification_code.len() != 4 || !verification_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_VERIFICATION_CODE".to_string(),
                "must be exactly 4 digits".to_string(),
            ));
        }

        let delay_ms = parse_u64("ORDER_SIMULATED_DELAY_MS", &get("ORDER_SIMULATED_DELAY_MS", "2000"))?;
        let redirect_secs = parse_u64("ORDER_REDIRECT_DELAY_SECS", &get("ORDER_REDIRECT_DELAY_SECS", "3"))?;

        Ok(Self {
            backend: BackendConfig {
                base_url,
                api_token,
            },
            verification_code,
            simulated_order_delay: Duration::from_millis(delay_ms),
            redirect_delay: Duration::from_secs(redirect_secs),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend.base_url.as_str(), "http://localhost:5000/");
        assert!(config.backend.api_token.is_none());
        assert_eq!(config.verification_code, "1234");
        assert_eq!(config.simulated_order_delay, Duration::from_secs(2));
        assert_eq!(config.redirect_delay, Duration::from_secs(3));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_sentry_dsn() {
        let dsn = "https://key@o0.ingest.sentry.io/1";
        assert_eq!(load(&[("SENTRY_DSN", dsn)]).unwrap().sentry_dsn.as_deref(), Some(dsn));
        assert!(load(&[("SENTRY_DSN", "")]).unwrap().sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_verification_code() {
        let err = load(&[("CHECKOUT_VERIFICATION_CODE", "12345")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "CHECKOUT_VERIFICATION_CODE"));
    }

    #[test]
    fn test_invalid_backend_url() {
        assert!(load(&[("BACKEND_BASE_URL", "not a url")]).is_err());
        assert!(load(&[("BACKEND_BASE_URL", "ftp://backend")]).is_err());
    }

    #[test]
    fn test_invalid_delay() {
        assert!(load(&[("ORDER_SIMULATED_DELAY_MS", "soon")]).is_err());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = load(&[("BACKEND_BASE_URL", "https://api.animetribes.test/v2/")]).unwrap();
        assert_eq!(
            config.backend.endpoint("/api/animeTribes/orders"),
            "https://api.animetribes.test/v2/api/animeTribes/orders"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("BACKEND_API_TOKEN", "tok_live_9f8e7d")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("tok_live_9f8e7d"));
        assert!(debug.contains("[REDACTED]"));
    }
}
