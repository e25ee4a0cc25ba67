//! Configuration module for the board API.
//! Reads process settings from the environment and wires up the service.
mod dependencies;

pub use dependencies::Dependencies;

use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use board_core::ServiceSettings;
use tracing::warn;

/// Default bind address.
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Default bind port.
const DEFAULT_PORT: u16 = 5000;

/// Default base delay between vote conflict retries, in milliseconds.
const DEFAULT_VOTE_RETRY_DELAY_MS: u64 = 10;

/// Where posts, comments, votes and reports are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory. Everything is lost on restart.
    Memory,
    /// PostgreSQL at `DATABASE_URL`.
    Postgres,
}

impl StorageBackend {
    fn from_env() -> Self {
        match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" | "in-memory" => Self::Memory,
            "postgres" | "postgresql" => Self::Postgres,
            other => {
                warn!(value = other, "Invalid STORAGE_BACKEND, defaulting to 'memory'");
                Self::Memory
            }
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`. Anything other than "json" gets console output.
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Process settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub service: ServiceSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            storage: StorageBackend::Memory,
            database_url: None,
            run_migrations: true,
            cors_allowed_origins: Vec::new(),
            service: ServiceSettings::default(),
        }
    }
}

impl Settings {
    /// Reads settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SERVER_HOST`: bind address (default: 0.0.0.0)
    /// - `SERVER_PORT`: bind port (default: 5000)
    /// - `STORAGE_BACKEND`: "memory" or "postgres" (default: memory)
    /// - `DATABASE_URL`: PostgreSQL connection string, required for postgres
    /// - `RUN_MIGRATIONS`: apply embedded migrations at startup (default: true)
    /// - `CORS_ALLOWED_ORIGINS`: comma-separated origins (default: any)
    /// - `VOTE_RETRY_ATTEMPTS`: retries after a vote conflict (default: 3)
    /// - `REPORT_FLAG_THRESHOLD`: pending reports that flag a target, 0 disables (default: 0)
    ///
    /// Unparseable values are logged and replaced by their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: parse_var("SERVER_HOST", defaults.host),
            port: parse_var("SERVER_PORT", defaults.port),
            storage: StorageBackend::from_env(),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            run_migrations: parse_var("RUN_MIGRATIONS", defaults.run_migrations),
            cors_allowed_origins,
            service: ServiceSettings {
                vote_retry_attempts: parse_var(
                    "VOTE_RETRY_ATTEMPTS",
                    defaults.service.vote_retry_attempts,
                ),
                vote_retry_delay: Duration::from_millis(DEFAULT_VOTE_RETRY_DELAY_MS),
                report_flag_threshold: parse_var(
                    "REPORT_FLAG_THRESHOLD",
                    defaults.service.report_flag_threshold,
                ),
            },
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
