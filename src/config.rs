//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - upstream REST API (default: `http://localhost:5000`)
//! - `HOST` / `PORT` - bind address (default: `0.0.0.0:8083`)
//! - `DATABASE_URL` - PostgreSQL for client state; in-memory when unset
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 10)
//! - `NATS_URL` - publish domain events when set
//! - `API_SERVICE_TOKEN` - bearer token for the background pollers; they stay off without it
//! - `API_TIMEOUT_SECS` - upstream request timeout (default: 15)
//! - `DASHBOARD_POLL_SECS` - dashboard stats refresh (default: 10)
//! - `CATALOG_POLL_SECS` - admin product snapshot refresh (default: 60)
//! - `STORE_NAME` - shown in emails (default: `Optica`)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Implements `Debug` manually to redact credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    pub service_token: Option<String>,
    pub api_timeout_secs: u64,
    pub dashboard_poll: Duration,
    pub catalog_poll: Duration,
    pub store_name: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("bind_addr", &self.bind_addr())
            .field("database_url", &redact(&self.database_url))
            .field("nats_url", &self.nats_url)
            .field("service_token", &redact(&self.service_token))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("dashboard_poll", &self.dashboard_poll)
            .field("catalog_poll", &self.catalog_poll)
            .field("store_name", &self.store_name)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8083,
            database_url: None,
            database_max_connections: 10,
            nats_url: None,
            service_token: None,
            api_timeout_secs: 15,
            dashboard_poll: Duration::from_secs(10),
            catalog_poll: Duration::from_secs(60),
            store_name: "Optica".to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment; `main` loads `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Ok(Self {
            api_base_url: get("API_BASE_URL").unwrap_or(defaults.api_base_url),
            host: parse(&get, "HOST")?.unwrap_or(defaults.host),
            port: parse(&get, "PORT")?.unwrap_or(defaults.port),
            database_url: get("DATABASE_URL"),
            database_max_connections: parse(&get, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(defaults.database_max_connections),
            nats_url: get("NATS_URL"),
            service_token: get("API_SERVICE_TOKEN"),
            api_timeout_secs: parse(&get, "API_TIMEOUT_SECS")?.unwrap_or(defaults.api_timeout_secs),
            dashboard_poll: parse(&get, "DASHBOARD_POLL_SECS")?.map(Duration::from_secs).unwrap_or(defaults.dashboard_poll),
            catalog_poll: parse(&get, "CATALOG_POLL_SECS")?.map(Duration::from_secs).unwrap_or(defaults.catalog_poll),
            store_name: get("STORE_NAME").unwrap_or(defaults.store_name),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    get(key).map(|v| v.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))).transpose()
}
