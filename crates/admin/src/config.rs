//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Database
//! - `MONGODB_URI` - MongoDB connection string (default: `mongodb://localhost:27017/`)
//! - `MONGODB_DATABASE` - Database name (default: `MarketMateDB`)
//! - `MONGODB_MAX_POOL_SIZE` - Connection pool ceiling (default: 10)
//!
//! ## Server
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5000)
//! - `BASE_URL` - Public URL; `https://` enables secure cookies
//!   (default: `http://localhost:{PORT}`)
//! - `REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//!
//! ## Sessions
//! - `SECRET_KEY` - Cookie signing secret (min 32 chars, high entropy).
//!   When unset a random key is generated per process and sessions do not
//!   survive restarts.
//! - `SESSION_EXPIRY_HOURS` - Inactivity expiry (default: 24)
//!
//! ## Observability
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/";
const DEFAULT_DATABASE: &str = "MarketMateDB";
const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SESSION_EXPIRY_HOURS: u32 = 24;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// MongoDB connection settings.
///
/// Implements `Debug` manually to redact the URI, which may carry credentials.
#[derive(Clone)]
pub struct MongoConfig {
    /// Connection string
    pub uri: SecretString,
    /// Database holding every collection
    pub database: String,
    /// Upper bound on pooled connections
    pub max_pool_size: u32,
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_pool_size", &self.max_pool_size)
            .finish()
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: SecretString::from(DEFAULT_MONGODB_URI),
            database: DEFAULT_DATABASE.to_owned(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
        }
    }
}

impl MongoConfig {
    /// Load only the database settings. Used by the CLI.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the pool size is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let max_pool_size = at_least_one(
            "MONGODB_MAX_POOL_SIZE",
            parse_env_or_default("MONGODB_MAX_POOL_SIZE", DEFAULT_MAX_POOL_SIZE)?,
        )?;

        Ok(Self {
            uri: SecretString::from(get_env_or_default("MONGODB_URI", DEFAULT_MONGODB_URI)),
            database: get_env_or_default("MONGODB_DATABASE", DEFAULT_DATABASE),
            max_pool_size,
        })
    }
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Document database settings
    pub mongo: MongoConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Cookie signing secret; `None` means a per-process random key
    pub secret_key: Option<SecretString>,
    /// Sessions expire after this much inactivity
    pub session_expiry: Duration,
    /// Requests taking longer than this are aborted
    pub request_timeout: Duration,
    /// Log formatter selection
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            mongo: MongoConfig::default(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            base_url: format!("http://localhost:{DEFAULT_PORT}"),
            secret_key: None,
            session_expiry: hours(DEFAULT_SESSION_EXPIRY_HOURS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or if
    /// `SECRET_KEY` fails validation (length, placeholder detection, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mongo = MongoConfig::from_env()?;
        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = parse_env_or_default("PORT", DEFAULT_PORT)?;
        let base_url = get_optional_env("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let secret_key = match get_optional_env("SECRET_KEY") {
            Some(value) => {
                let secret = SecretString::from(value);
                validate_session_secret(&secret, "SECRET_KEY")?;
                validate_secret_strength(secret.expose_secret(), "SECRET_KEY")?;
                Some(secret)
            }
            None => None,
        };

        let expiry_hours = at_least_one(
            "SESSION_EXPIRY_HOURS",
            parse_env_or_default("SESSION_EXPIRY_HOURS", DEFAULT_SESSION_EXPIRY_HOURS)?,
        )?;
        let timeout_secs = at_least_one(
            "REQUEST_TIMEOUT_SECS",
            parse_env_or_default("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        )?;

        let log_format = get_optional_env("LOG_FORMAT")
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            mongo,
            host,
            port,
            base_url,
            secret_key,
            session_expiry: hours(expiry_hours),
            request_timeout: Duration::from_secs(timeout_secs),
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the panel is served over HTTPS (cookies get the Secure flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

const fn hours(n: u32) -> Duration {
    Duration::from_secs(n as u64 * 60 * 60)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Reject zero for counts and durations that must be positive.
fn at_least_one<T>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: Copy + Into<u64>,
{
    if value.into() == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme-changeme-changeme-1234567", "SECRET_KEY")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "SECRET_KEY");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "SECRET_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "SECRET_KEY").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "SECRET_KEY").is_ok());
    }

    #[test]
    fn test_zero_is_rejected_for_positive_settings() {
        let err = at_least_one("REQUEST_TIMEOUT_SECS", 0_u64).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::InvalidEnvVar(key, _) if key == "REQUEST_TIMEOUT_SECS"
        ));
        assert!(at_least_one("SESSION_EXPIRY_HOURS", 0_u32).is_err());
        assert_eq!(at_least_one("REQUEST_TIMEOUT_SECS", 30_u64).unwrap(), 30);
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.mongo.database, "MarketMateDB");
        assert_eq!(config.mongo.max_pool_size, 10);
        assert_eq!(config.session_expiry, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.secret_key.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_is_secure_follows_base_url() {
        let config = AdminConfig {
            base_url: "https://admin.marketmate.io".to_string(),
            ..AdminConfig::default()
        };
        assert!(config.is_secure());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_mongo_config_debug_redacts_uri() {
        let config = MongoConfig {
            uri: SecretString::from("mongodb://root:hunter2@db:27017/"),
            ..MongoConfig::default()
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("MarketMateDB"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
