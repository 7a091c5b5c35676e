//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GROCERY_DATABASE_URL` - `PostgreSQL` connection string, or `memory://`
//!   for the in-process database (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `GROCERY_HOST` - Bind address (default: 127.0.0.1)
//! - `GROCERY_PORT` - Listen port (default: 3000)
//! - `GROCERY_BASE_URL` - Public URL (default: <http://localhost:3000>);
//!   an `https` URL turns on secure session cookies
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: development)
//! - `GROCERY_LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::db;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Grocery application configuration.
#[derive(Debug, Clone)]
pub struct GroceryConfig {
    /// Database connection URL (may contain a password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: String,
    /// Emit JSON log lines instead of human-readable text
    pub json_logs: bool,
}

impl GroceryConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("GROCERY_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("GROCERY_DATABASE_URL".to_owned()))?;

        let host = or_default(&lookup, "GROCERY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GROCERY_HOST".to_owned(), e.to_string()))?;
        let port = or_default(&lookup, "GROCERY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GROCERY_PORT".to_owned(), e.to_string()))?;
        let base_url = Url::parse(&or_default(&lookup, "GROCERY_BASE_URL", "http://localhost:3000"))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GROCERY_BASE_URL".to_owned(), e.to_string())
            })?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: or_default(&lookup, "SENTRY_ENVIRONMENT", "development"),
            json_logs: lookup("GROCERY_LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Configuration for tests and local runs: in-memory database, defaults
    /// everywhere else.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in defaults fail to parse.
    pub fn in_memory() -> Result<Self, ConfigError> {
        let vars = HashMap::from([("GROCERY_DATABASE_URL", db::MEMORY_DATABASE_URL)]);
        Self::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned()))
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Whether the in-process database is selected.
    #[must_use]
    pub fn uses_memory_database(&self) -> bool {
        db::is_memory_url(&self.database_url)
    }
}

/// Look up a key, falling back to a default value.
fn or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_owned())
}
