//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STAMPCARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; not needed when `STAMPCARD_STORE=memory`)
//!
//! ## Optional
//! - `STAMPCARD_STORE` - `postgres` (default) or `memory`
//! - `STAMPCARD_HOST` - Bind address (default: 127.0.0.1)
//! - `STAMPCARD_PORT` - Listen port (default: 3000)
//! - `STAMPCARD_ID_MAX_ATTEMPTS` - Customer id regeneration bound (default: 50)
//! - `STAMPCARD_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate, 0.0 to 1.0 (default: 1.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::DEFAULT_MAX_ID_ATTEMPTS;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3000;

/// Environment variable bounding customer id regeneration.
pub const ID_MAX_ATTEMPTS_ENV: &str = "STAMPCARD_ID_MAX_ATTEMPTS";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where customers are persisted.
#[derive(Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` at the given URL (contains password).
    Postgres { database_url: SecretString },
    /// Process memory; data is lost on exit.
    Memory,
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Customer store backend
    pub store: StoreBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bound on customer id regeneration during registration
    pub id_max_attempts: u32,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = match get_env_or_default("STAMPCARD_STORE", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: get_database_url("STAMPCARD_DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STAMPCARD_STORE".to_string(),
                    format!("unknown backend '{other}' (expected postgres or memory)"),
                ));
            }
        };
        let host = parse_or_default(
            "STAMPCARD_HOST",
            get_optional_env("STAMPCARD_HOST"),
            DEFAULT_HOST,
        )?;
        let port = parse_or_default(
            "STAMPCARD_PORT",
            get_optional_env("STAMPCARD_PORT"),
            DEFAULT_PORT,
        )?;
        let id_max_attempts = id_max_attempts_from_env()?;
        let log_json = get_optional_env("STAMPCARD_LOG_JSON").is_some();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate =
            parse_sample_rate("SENTRY_SAMPLE_RATE", get_optional_env("SENTRY_SAMPLE_RATE"))?;
        let sentry_traces_sample_rate = parse_sample_rate(
            "SENTRY_TRACES_SAMPLE_RATE",
            get_optional_env("SENTRY_TRACES_SAMPLE_RATE"),
        )?;

        Ok(Self {
            store,
            host,
            port,
            id_max_attempts,
            log_json,
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
}

/// Get database URL with fallback to `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Read the id regeneration bound from `STAMPCARD_ID_MAX_ATTEMPTS`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` unless the value is a positive integer.
pub fn id_max_attempts_from_env() -> Result<u32, ConfigError> {
    parse_attempts(get_optional_env(ID_MAX_ATTEMPTS_ENV))
}

/// Parse an id regeneration bound, defaulting to 50 when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for zero or non-numeric values.
pub fn parse_attempts(value: Option<String>) -> Result<u32, ConfigError> {
    let attempts = parse_or_default(ID_MAX_ATTEMPTS_ENV, value, DEFAULT_MAX_ID_ATTEMPTS)?;
    if attempts == 0 {
        return Err(ConfigError::InvalidEnvVar(
            ID_MAX_ATTEMPTS_ENV.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(attempts)
}

fn parse_sample_rate(key: &str, value: Option<String>) -> Result<f32, ConfigError> {
    let rate = parse_or_default(key, value, 1.0_f32)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ));
    }
    Ok(rate)
}
