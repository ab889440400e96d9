//! Environment-driven settings for the agentlens binaries.
//!
//! Every value has a default except `DATABASE_PASSWORD`. Binaries call
//! `dotenvy::dotenv()` before [`Settings::from_env`], so a local `.env` file
//! works the same as exported variables.

use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Variables
// ─────────────────────────────────────────────────────────────────────────────

pub const DATABASE_HOST: &str = "DATABASE_HOST";
pub const DATABASE_PORT: &str = "DATABASE_PORT";
pub const DATABASE_NAME: &str = "DATABASE_NAME";
pub const DATABASE_USER: &str = "DATABASE_USER";
pub const DATABASE_PASSWORD: &str = "DATABASE_PASSWORD";
pub const DATABASE_MIN_CONNECTIONS: &str = "DATABASE_MIN_CONNECTIONS";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const DATABASE_COMMAND_TIMEOUT_SECS: &str = "DATABASE_COMMAND_TIMEOUT_SECS";
pub const SERVER_ADDR: &str = "SERVER_ADDR";
/// Log directory for the CLI; read by clap, so it needs no database password.
pub const LOGS_DIR: &str = "AGENTLENS_LOGS_DIR";
pub const DEFAULT_LOGS_DIR: &str = "logs";

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL connection and pool settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Upper bound for a single statement and for pool acquisition.
    pub command_timeout_secs: u64,
}

// Keeps the password out of logs.
impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub addr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads settings through `lookup`; a `None` or blank value means unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let password = get(DATABASE_PASSWORD)
            .ok_or_else(|| ConfigError::Missing(DATABASE_PASSWORD.to_string()))?;

        let database = DatabaseSettings {
            host: get(DATABASE_HOST).unwrap_or_else(|| "postgres".into()),
            port: parse_or(get(DATABASE_PORT), DATABASE_PORT, 18788)?,
            name: get(DATABASE_NAME).unwrap_or_else(|| "sgr_memory_vault".into()),
            user: get(DATABASE_USER).unwrap_or_else(|| "admin".into()),
            password,
            min_connections: parse_or(get(DATABASE_MIN_CONNECTIONS), DATABASE_MIN_CONNECTIONS, 2)?,
            max_connections: parse_or(get(DATABASE_MAX_CONNECTIONS), DATABASE_MAX_CONNECTIONS, 10)?,
            command_timeout_secs: parse_or(
                get(DATABASE_COMMAND_TIMEOUT_SECS),
                DATABASE_COMMAND_TIMEOUT_SECS,
                60,
            )?,
        };

        if database.max_connections == 0 {
            return Err(invalid(DATABASE_MAX_CONNECTIONS, "0"));
        }
        if database.min_connections > database.max_connections {
            return Err(invalid(
                DATABASE_MIN_CONNECTIONS,
                &database.min_connections.to_string(),
            ));
        }

        Ok(Self {
            database,
            server: ServerSettings {
                addr: get(SERVER_ADDR).unwrap_or_else(|| "0.0.0.0:8000".into()),
            },
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, var: &str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| invalid(var, &value)),
    }
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
    }
}
