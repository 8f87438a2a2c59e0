//! Odoo connection configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ODOO_URL` - Base URL of the Odoo server (e.g., <https://erp.example.com>)
//! - `ODOO_DB` - Database name
//! - `ODOO_USER` - Login of the API user
//! - `ODOO_API_KEY` - API key (or password) of the API user
//!
//! ## Optional
//! - `ODOO_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
///
/// All of these are raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Missing Odoo setting: {0}")]
    MissingSetting(&'static str),
    #[error("Invalid Odoo URL {0:?}: {1}")]
    InvalidUrl(String, String),
}

/// Connection settings for one Odoo database.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct OdooConfig {
    /// Server base URL, always ending in `/`
    pub url: Url,
    /// Database name
    pub db: String,
    /// Login of the API user
    pub user: String,
    /// API key or password
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooConfig")
            .field("url", &self.url.as_str())
            .field("db", &self.db)
            .field("user", &self.user)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OdooConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSetting` if any value is blank and
    /// `ConfigError::InvalidUrl` if `url` is not an absolute http(s) URL.
    pub fn new(
        url: &str,
        db: impl Into<String>,
        user: impl Into<String>,
        api_key: SecretString,
    ) -> Result<Self, ConfigError> {
        use secrecy::ExposeSecret;

        let db = db.into();
        let user = user.into();
        if url.trim().is_empty() {
            return Err(ConfigError::MissingSetting("url"));
        }
        if db.trim().is_empty() {
            return Err(ConfigError::MissingSetting("db"));
        }
        if user.trim().is_empty() {
            return Err(ConfigError::MissingSetting("user"));
        }
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingSetting("api_key"));
        }

        Ok(Self {
            url: parse_base_url(url)?,
            db,
            user,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        let url = required("ODOO_URL")?;
        let db = required("ODOO_DB")?;
        let user = required("ODOO_USER")?;
        let api_key = SecretString::from(required("ODOO_API_KEY")?);

        let timeout = match lookup("ODOO_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self::new(&url, db, user, api_key)?.with_timeout(timeout))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    // Endpoint paths are joined onto the base, which only keeps the last
    // segment when the path ends in a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("ODOO_TIMEOUT_SECS".to_string(), reason);
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| invalid(e.to_string()))?;
    if secs == 0 {
        return Err(invalid("must be greater than 0".to_string()));
    }
    Ok(Duration::from_secs(secs))
}
