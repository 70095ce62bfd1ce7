//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORERATE_JWT_SECRET` - HS256 signing secret (min 32 chars)
//!
//! ## Optional
//! - `STORERATE_BIND_ADDR` - Listen address (default: 0.0.0.0:8080)
//! - `STORERATE_DATABASE_URL` - `PostgreSQL` connection string; in-memory storage when unset
//! - `STORERATE_TOKEN_TTL_MINUTES` - Access token lifetime (default: 1440)
//! - `STORERATE_LOG_FORMAT` - `json` or `pretty` (default: json)
//! - `STORERATE_SEED_DEMO` - Seed demo accounts and stores on startup (default: false)

use std::net::SocketAddr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub use storerate_observability::LogFormat;

pub const MIN_JWT_SECRET_LENGTH: usize = 32;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(String),
    #[error("Invalid environment variable {0}: {1}")]
    Invalid(String, String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory repository.
    pub database_url: Option<SecretString>,
    pub jwt_secret: SecretString,
    pub token_ttl: chrono::Duration,
    pub log_format: LogFormat,
    pub seed_demo: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("log_format", &self.log_format)
            .field("seed_demo", &self.seed_demo)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("STORERATE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid("STORERATE_BIND_ADDR".into(), e.to_string()))?;

        let jwt_secret = get("STORERATE_JWT_SECRET")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::Missing("STORERATE_JWT_SECRET".into()))?;
        validate_jwt_secret(&jwt_secret)?;

        let ttl_minutes = match get("STORERATE_TOKEN_TTL_MINUTES") {
            None => DEFAULT_TOKEN_TTL_MINUTES,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| {
                    ConfigError::Invalid(
                        "STORERATE_TOKEN_TTL_MINUTES".into(),
                        format!("expected a positive number of minutes, got '{raw}'"),
                    )
                })?,
        };

        let log_format = match get("STORERATE_LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid(
                    "STORERATE_LOG_FORMAT".into(),
                    format!("expected 'json' or 'pretty', got '{other}'"),
                ));
            }
        };

        let seed_demo = match get("STORERATE_SEED_DEMO").as_deref() {
            None => false,
            Some(v) => parse_bool(v).ok_or_else(|| {
                ConfigError::Invalid("STORERATE_SEED_DEMO".into(), format!("expected a boolean, got '{v}'"))
            })?,
        };

        Ok(Self {
            bind_addr,
            database_url: get("STORERATE_DATABASE_URL").map(SecretString::from),
            jwt_secret,
            token_ttl: chrono::Duration::minutes(ttl_minutes),
            log_format,
            seed_demo,
        })
    }
}

fn validate_jwt_secret(secret: &SecretString) -> Result<(), ConfigError> {
    if secret.expose_secret().chars().count() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::Invalid(
            "STORERATE_JWT_SECRET".into(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
