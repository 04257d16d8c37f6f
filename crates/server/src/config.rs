//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NEPOSTORE_API_URL` - Base URL of the backend REST API
//!
//! ## Optional
//! - `NEPOSTORE_HOST` - Bind address (default: 127.0.0.1)
//! - `NEPOSTORE_PORT` - Listen port (default: 3000)
//! - `NEPOSTORE_BASE_DOMAIN` - Platform domain shops live under (default: nepostore.xyz)
//! - `NEPOSTORE_BASE_LABELS` - Labels in the base domain (default: 2)
//! - `NEPOSTORE_DASHBOARD_URL` - Dashboard origin (default: `https://app.<base domain>`)
//! - `NEPOSTORE_LOGIN_URL` - Where unauthenticated dashboard users go (default: `<dashboard>/login`)
//! - `NEPOSTORE_API_TIMEOUT_SECS` - Per-call API timeout (default: 15)
//! - `NEPOSTORE_SETTINGS_TTL_SECS` - Store settings cache TTL (default: 300)
//! - `NEPOSTORE_MAX_IMAGE_BYTES` - Largest accepted image upload (default: 5 MiB)
//! - `NEPOSTORE_SECURE_COOKIES` - Mark the session cookie `Secure` (default: false)
//! - `NEPOSTORE_API_TOKEN` - Service token sent as a bearer token to the API
//! - `NEPOSTORE_LOG_JSON` - Emit JSON logs instead of text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use nepostore_core::tenant::{DEFAULT_BASE_LABELS, TenantResolver};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Backend API base URL, without a trailing slash.
    pub api_url: Url,
    pub api_token: Option<SecretString>,
    pub api_timeout: Duration,
    pub base_domain: String,
    pub base_labels: usize,
    pub dashboard_url: String,
    pub login_url: String,
    pub settings_ttl: Duration,
    pub max_image_bytes: usize,
    pub secure_cookies: bool,
    pub log_json: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_timeout", &self.api_timeout)
            .field("base_domain", &self.base_domain)
            .field("base_labels", &self.base_labels)
            .field("dashboard_url", &self.dashboard_url)
            .field("login_url", &self.login_url)
            .field("settings_ttl", &self.settings_ttl)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("secure_cookies", &self.secure_cookies)
            .field("log_json", &self.log_json)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("NEPOSTORE_API_URL")?)?;
        let host = parse_env("NEPOSTORE_HOST", "127.0.0.1")?;
        let port = parse_env("NEPOSTORE_PORT", "3000")?;
        let base_domain = get_env_or_default("NEPOSTORE_BASE_DOMAIN", "nepostore.xyz");
        let base_labels = parse_env("NEPOSTORE_BASE_LABELS", &DEFAULT_BASE_LABELS.to_string())?;
        let dashboard_url = get_optional_env("NEPOSTORE_DASHBOARD_URL")
            .unwrap_or_else(|| default_dashboard_url(&base_domain));
        let login_url = get_optional_env("NEPOSTORE_LOGIN_URL")
            .unwrap_or_else(|| format!("{}/login", dashboard_url.trim_end_matches('/')));

        Ok(Self {
            host,
            port,
            api_url,
            api_token: get_optional_env("NEPOSTORE_API_TOKEN").map(SecretString::from),
            api_timeout: Duration::from_secs(parse_env("NEPOSTORE_API_TIMEOUT_SECS", "15")?),
            base_domain,
            base_labels,
            dashboard_url,
            login_url,
            settings_ttl: Duration::from_secs(parse_env("NEPOSTORE_SETTINGS_TTL_SECS", "300")?),
            max_image_bytes: parse_env(
                "NEPOSTORE_MAX_IMAGE_BYTES",
                &DEFAULT_MAX_IMAGE_BYTES.to_string(),
            )?,
            secure_cookies: parse_flag("NEPOSTORE_SECURE_COOKIES"),
            log_json: parse_flag("NEPOSTORE_LOG_JSON"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and tools: everything defaulted around an API URL.
    #[must_use]
    pub fn for_api(api_url: Url) -> Self {
        let base_domain = "nepostore.xyz".to_string();
        let dashboard_url = default_dashboard_url(&base_domain);
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            api_url,
            api_token: None,
            api_timeout: Duration::from_secs(15),
            login_url: format!("{dashboard_url}/login"),
            dashboard_url,
            base_domain,
            base_labels: DEFAULT_BASE_LABELS,
            settings_ttl: Duration::from_secs(300),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            secure_cookies: false,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Hostname resolver configured for the platform's base domain.
    #[must_use]
    pub fn resolver(&self) -> TenantResolver {
        TenantResolver::new().with_base_labels(self.base_labels)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_dashboard_url(base_domain: &str) -> String {
    format!("https://app.{base_domain}")
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| {
        ConfigError::InvalidEnvVar("NEPOSTORE_API_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "NEPOSTORE_API_URL".to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_flag(key: &str) -> bool {
    get_optional_env(key).is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::for_api(Url::parse("http://api.test").unwrap())
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_defaults_derive_from_base_domain() {
        let config = config();
        assert_eq!(config.dashboard_url, "https://app.nepostore.xyz");
        assert_eq!(config.login_url, "https://app.nepostore.xyz/login");
    }

    #[test]
    fn test_parse_api_url() {
        assert_eq!(
            parse_api_url("https://api.nepostore.xyz/").unwrap().as_str(),
            "https://api.nepostore.xyz/"
        );
        assert!(matches!(
            parse_api_url("ftp://api"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = config();
        config.api_token = Some(SecretString::from("super_secret_token"));
        config.sentry_dsn = Some("https://key@sentry.io/1".to_string());

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
        assert!(!debug_output.contains("key@sentry"));
    }
}
