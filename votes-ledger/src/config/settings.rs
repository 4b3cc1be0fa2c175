//! Environment-driven settings.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use votes_ledger_engine::query::DEFAULT_CACHE_CAPACITY;

use crate::errors::ServiceError;

const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;
const DEFAULT_INVALIDATION_CAPACITY: usize = 1024;
const DEFAULT_COUNTS_CACHE_CAPACITY: usize = DEFAULT_CACHE_CAPACITY;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

/// Connection mode for PostgreSQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection every `retry_interval` until successful.
    Retry,
}

impl ConnectionMode {
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set.
    fn parse(value: Option<String>) -> Result<Self, ServiceError> {
        let Some(raw) = value else {
            return Ok(Self::Retry);
        };
        match raw.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Ok(Self::FailFast),
            "retry" => Ok(Self::Retry),
            _ => Err(ServiceError::config(format!(
                "DATABASE_CONNECTION_MODE has an invalid value: {raw}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub server_addr: SocketAddr,
    pub max_connections: u32,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub run_migrations: bool,
    pub invalidation_capacity: usize,
    pub counts_cache_capacity: usize,
    pub cors_allowed_origins: Vec<String>,
}

impl Settings {
    /// Reads all settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `SERVER_HOST`: Listen address (default: 127.0.0.1)
    /// - `SERVER_PORT`: Listen port (default: 8080)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `DATABASE_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `DATABASE_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
    /// - `INVALIDATION_CHANNEL_CAPACITY`: Buffered invalidation events (default: 1024)
    /// - `COUNTS_CACHE_CAPACITY`: Targets kept in the counts cache (default: 10000)
    /// - `CORS_ALLOWED_ORIGINS`: Comma separated origins (default: http://localhost:3000)
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Every variable present and well formed
    /// * `Err(ServiceError::Config)` - A required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ServiceError> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ServiceError::config("DATABASE_URL must be set"))?;

        let host = parse_var("SERVER_HOST", DEFAULT_SERVER_HOST)?;
        let port = parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url,
            server_addr: SocketAddr::new(host, port),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            connection_mode: ConnectionMode::parse(env::var("DATABASE_CONNECTION_MODE").ok())?,
            retry_interval: Duration::from_secs(parse_var(
                "DATABASE_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )?),
            run_migrations: parse_bool("RUN_MIGRATIONS", true)?,
            invalidation_capacity: parse_var(
                "INVALIDATION_CHANNEL_CAPACITY",
                DEFAULT_INVALIDATION_CAPACITY,
            )?,
            counts_cache_capacity: parse_var(
                "COUNTS_CACHE_CAPACITY",
                DEFAULT_COUNTS_CACHE_CAPACITY,
            )?,
            cors_allowed_origins,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ServiceError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ServiceError::config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(name: &str, default: bool) -> Result<bool, ServiceError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ServiceError::config(format!("{name} has an invalid value: {raw}"))),
        },
        Err(_) => Ok(default),
    }
}
