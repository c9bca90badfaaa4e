//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use points_ledger::db::DatabaseConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Where ledger state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL at `DatabaseConfig::database_url`
    Postgres,
    /// Process memory; lost on exit
    Memory,
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Storage backend
    pub storage: StorageBackend,
    /// Database configuration (used with `StorageBackend::Postgres`)
    pub database: DatabaseConfig,
    /// Deadline for a single unit of work, in seconds
    pub transaction_timeout_secs: u64,
    /// Prometheus scrape address; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Whether `/reset` may wipe the ledger
    pub allow_reset: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SERVER_BIND` (default `127.0.0.1:8080`)
    /// - `STORAGE` = `postgres` | `memory` (default `postgres`)
    /// - `DATABASE_URL`, `DB_*` (see [`DatabaseConfig::from_env`])
    /// - `TRANSACTION_TIMEOUT_SECS` (default 10)
    /// - `METRICS_BIND` (optional)
    /// - `ALLOW_RESET` (default false)
    ///
    /// CLI overrides take precedence over the environment.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        memory_override: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_required_format("SERVER_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080))),
        };

        let storage = if memory_override {
            StorageBackend::Memory
        } else {
            match std::env::var("STORAGE").ok().as_deref() {
                None | Some("postgres") => StorageBackend::Postgres,
                Some("memory") => StorageBackend::Memory,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        var: "STORAGE".to_string(),
                        reason: format!("unknown backend {other:?}, expected postgres or memory"),
                    });
                }
            }
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        Ok(ServerConfig {
            bind,
            storage,
            database,
            transaction_timeout_secs: parse_env_or("TRANSACTION_TIMEOUT_SECS", 10),
            metrics_bind: parse_env_required_format("METRICS_BIND")?,
            allow_reset: parse_env_or("ALLOW_RESET", false),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transaction_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "TRANSACTION_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.storage == StorageBackend::Postgres {
            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        self.database.max_connections
                    ),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: "Must differ from SERVER_BIND".to_string(),
            });
        }

        Ok(())
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Optional variable that must parse when present
fn parse_env_required_format<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map(Some).map_err(|e| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("{raw:?}: {e}"),
        }),
        Err(_) => Ok(None),
    }
}
