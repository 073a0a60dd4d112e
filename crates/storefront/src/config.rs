//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>);
//!   an `https://` URL turns on secure session cookies
//! - `STOREFRONT_CATALOG_PATH` - JSON file replacing the built-in catalog
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `STOREFRONT_SESSION_CAPACITY` - Most visitor sessions kept in memory (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Optional catalog override file
    pub catalog_path: Option<PathBuf>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    pub log_format: LogFormat,
    /// Most sessions held at once; the least recently used are evicted
    pub session_capacity: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            catalog_path: None,
            static_dir: PathBuf::from("crates/storefront/static"),
            log_format: LogFormat::Pretty,
            session_capacity: 10_000,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_or("STOREFRONT_HOST", &lookup, defaults.host)?;
        let port = parse_or("STOREFRONT_PORT", &lookup, defaults.port)?;
        let base_url = lookup("STOREFRONT_BASE_URL").unwrap_or(defaults.base_url);
        let catalog_path = lookup("STOREFRONT_CATALOG_PATH").map(PathBuf::from);
        let static_dir = lookup("STOREFRONT_STATIC_DIR").map_or(defaults.static_dir, PathBuf::from);

        let log_format = match lookup("STOREFRONT_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_LOG_FORMAT".to_string(),
                    format!("expected 'pretty' or 'json', got '{other}'"),
                ));
            }
        };

        let session_capacity = parse_or(
            "STOREFRONT_SESSION_CAPACITY",
            &lookup,
            defaults.session_capacity,
        )?;
        if session_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_SESSION_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let sentry_sample_rate =
            parse_rate("SENTRY_SAMPLE_RATE", &lookup, defaults.sentry_sample_rate)?;
        let sentry_traces_sample_rate = parse_rate(
            "SENTRY_TRACES_SAMPLE_RATE",
            &lookup,
            defaults.sentry_traces_sample_rate,
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            static_dir,
            log_format,
            session_capacity,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
fn parse_or<T>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_rate(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: f32,
) -> Result<f32, ConfigError> {
    let rate = parse_or(key, lookup, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.session_capacity, 10_000);
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_CATALOG_PATH", "/etc/catalog.json"),
            ("STOREFRONT_LOG_FORMAT", "json"),
            ("STOREFRONT_SESSION_CAPACITY", "500"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.is_secure());
        assert_eq!(
            config.catalog_path.as_deref(),
            Some(std::path::Path::new("/etc/catalog.json"))
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session_capacity, 500);
        assert!(config.sentry_dsn.is_some());
        assert!((config.sentry_traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_port() {
        let result = StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_log_format() {
        let result = StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_LOG_FORMAT", "xml")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let result = StorefrontConfig::from_lookup(lookup(&[("SENTRY_SAMPLE_RATE", "1.5")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_disabled() {
        let config = StorefrontConfig::from_lookup(lookup(&[("SENTRY_DSN", "")])).unwrap();
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_zero_session_capacity() {
        let result =
            StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_SESSION_CAPACITY", "0")]));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_SESSION_CAPACITY")
        );
    }
}
