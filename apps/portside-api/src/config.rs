//! Service configuration loaded from environment variables.

use std::env;
use thiserror::Error;

/// Configuration errors; all fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration missing: {0}")]
    Missing(&'static str),

    #[error("Configuration invalid for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Maximum connections in the store pool.
    pub db_max_connections: u32,
    /// Listen address for the HTTP surface, e.g. `0.0.0.0:8080`.
    pub http_addr: String,
    /// Base URL of the procurement API.
    pub procurement_base_url: String,
    /// Provider id under which accounts and entitlements live.
    pub procurement_provider_id: String,
    /// API key for the procurement API.
    pub procurement_api_key: String,
    /// Procurement request timeout in seconds.
    pub procurement_timeout_secs: u64,
}

impl Config {
    /// Load configuration from the environment, failing fast on missing
    /// required values.
    ///
    /// Required: `DATABASE_URL`, `PROCUREMENT_PROVIDER_ID`,
    /// `PROCUREMENT_API_KEY`. Everything else has a default. The Kafka
    /// settings are read separately by
    /// [`portside_events::KafkaConfig::from_env`] when the subscriber is
    /// enabled.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let procurement_provider_id = env::var("PROCUREMENT_PROVIDER_ID")
            .map_err(|_| ConfigError::Missing("PROCUREMENT_PROVIDER_ID"))?;
        let procurement_api_key = env::var("PROCUREMENT_API_KEY")
            .map_err(|_| ConfigError::Missing("PROCUREMENT_API_KEY"))?;

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 10)?;
        let procurement_timeout_secs = parse_or("PROCUREMENT_TIMEOUT_SECS", 30)?;

        let http_addr = env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let procurement_base_url = env::var("PROCUREMENT_BASE_URL")
            .unwrap_or_else(|_| portside_procurement::client::DEFAULT_BASE_URL.to_string());

        Ok(Self {
            database_url,
            db_max_connections,
            http_addr,
            procurement_base_url,
            procurement_provider_id,
            procurement_api_key,
            procurement_timeout_secs,
        })
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}
