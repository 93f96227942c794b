//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOOKSTORE_API_URL` - Base URL of the bookstore REST API
//!
//! ## Optional
//! - `BOOKSTORE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 60, sized for cold starts)
//! - `BOOKSTORE_LOGOUT_COOLDOWN_MS` - Forced-logout cooldown window (default: 1000)
//! - `BOOKSTORE_SLOW_THRESHOLD_MS` - Delay before loading is reported as slow (default: 2000)
//! - `BOOKSTORE_LOGIN_PATH` - Location of the login view (default: /login)
//! - `BOOKSTORE_CREDENTIALS_FILE` - File backing the credential store
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOGOUT_COOLDOWN_MS: u64 = 1000;
const DEFAULT_SLOW_THRESHOLD_MS: u64 = 2000;
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bookstore client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub api_url: Url,
    /// Time after which an in-flight request fails as a timeout
    pub request_timeout: Duration,
    /// How long a forced logout suppresses further forced logouts
    pub logout_cooldown: Duration,
    /// How long loading must persist before it is reported as slow
    pub slow_threshold: Duration,
    /// Path of the login view that forced logouts redirect to
    pub login_path: String,
    /// File backing the durable credential store, if any
    pub credentials_file: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Configuration with default timings for the given API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            logout_cooldown: Duration::from_millis(DEFAULT_LOGOUT_COOLDOWN_MS),
            slow_threshold: Duration::from_millis(DEFAULT_SLOW_THRESHOLD_MS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            credentials_file: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `BOOKSTORE_API_URL` is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_url(
            "BOOKSTORE_API_URL",
            &get_required_env("BOOKSTORE_API_URL")?,
        )?;

        let mut config = Self::new(api_url);
        if let Some(raw) = get_optional_env("BOOKSTORE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_u64("BOOKSTORE_REQUEST_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get_optional_env("BOOKSTORE_LOGOUT_COOLDOWN_MS") {
            config.logout_cooldown =
                Duration::from_millis(parse_u64("BOOKSTORE_LOGOUT_COOLDOWN_MS", &raw)?);
        }
        if let Some(raw) = get_optional_env("BOOKSTORE_SLOW_THRESHOLD_MS") {
            config.slow_threshold =
                Duration::from_millis(parse_u64("BOOKSTORE_SLOW_THRESHOLD_MS", &raw)?);
        }
        if let Some(raw) = get_optional_env("BOOKSTORE_LOGIN_PATH") {
            config.login_path = parse_login_path("BOOKSTORE_LOGIN_PATH", &raw)?;
        }
        config.credentials_file = get_optional_env("BOOKSTORE_CREDENTIALS_FILE").map(PathBuf::from);
        config.sentry_dsn = get_optional_env("SENTRY_DSN");
        config.sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(config)
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the forced-logout cooldown.
    #[must_use]
    pub const fn with_logout_cooldown(mut self, cooldown: Duration) -> Self {
        self.logout_cooldown = cooldown;
        self
    }

    /// Set the slow-loading threshold.
    #[must_use]
    pub const fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_login_path(key: &str, raw: &str) -> Result<String, ConfigError> {
    let path = raw.trim();
    if !path.starts_with('/') {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must start with '/'".to_string(),
        ));
    }
    Ok(path.to_string())
}
