//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_URL` - Base URL of the catalog/stock API (e.g. `http://localhost:3333/`)
//!
//! ## Optional
//! - `CATALOG_TIMEOUT_SECS` - Catalog request timeout in seconds (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Product metadata cache TTL in seconds, 0 disables (default: 300)
//! - `CART_STORAGE_PATH` - Local storage file for the persisted cart (default: `.rocketshoes/storage.json`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3333)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog/stock API configuration
    pub catalog: CatalogConfig,
    /// Path of the local storage file holding the cart
    pub storage_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Catalog/stock API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; always ends with `/` so relative paths join beneath it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Product metadata cache TTL (`Duration::ZERO` disables caching)
    pub product_cache_ttl: Duration,
}

impl StorefrontConfig {
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

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3333")?;
        let catalog = CatalogConfig::from_env()?;
        let storage_path = PathBuf::from(get_env_or_default(
            "CART_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));

        Ok(Self {
            host,
            port,
            catalog,
            storage_path,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    /// Build a catalog configuration with default timeout and cache TTL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("CATALOG_API_URL", base_url)?,
            timeout: Duration::from_secs(10),
            product_cache_ttl: Duration::from_secs(300),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("CATALOG_API_URL")?;
        let timeout = parse_env_or_default::<u64>("CATALOG_TIMEOUT_SECS", "10")?;
        let ttl = parse_env_or_default::<u64>("CATALOG_CACHE_TTL_SECS", "300")?;

        if timeout == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url: parse_base_url("CATALOG_API_URL", &base_url)?,
            timeout: Duration::from_secs(timeout),
            product_cache_ttl: Duration::from_secs(ttl),
        })
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

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL and make sure it ends with `/`.
///
/// `Url::join` replaces the last path segment unless the base ends with a
/// slash, so `http://api/v1` + `stock/1` would otherwise become `http://api/stock/1`.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
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
    use super::*;

    #[test]
    fn test_parse_base_url_appends_trailing_slash() {
        let url = parse_base_url("TEST_VAR", "http://localhost:3333/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/api/");
        assert_eq!(
            url.join("stock/1").unwrap().as_str(),
            "http://localhost:3333/api/stock/1"
        );
    }

    #[test]
    fn test_parse_base_url_keeps_existing_slash() {
        let url = parse_base_url("TEST_VAR", "https://shoes.example/").unwrap();
        assert_eq!(url.as_str(), "https://shoes.example/");
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        let err = parse_base_url("TEST_VAR", "ftp://shoes.example").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("TEST_VAR", "not a url").is_err());
    }

    #[test]
    fn test_catalog_config_defaults() {
        let config = CatalogConfig::new("http://localhost:3333").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.product_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3333,
            catalog: CatalogConfig::new("http://localhost:4000").unwrap(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3333);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("CATALOG_API_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: CATALOG_API_URL"
        );
    }
}
