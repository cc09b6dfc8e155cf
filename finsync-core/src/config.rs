//! Run configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file,
//! environment variables, then whatever the caller sets explicitly.

use crate::domain::{DataType, UnknownDataType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DB_BACKEND: &str = "DB_BACKEND";
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_PATH: &str = "DB_PATH";
pub const ENV_PROVIDER_TIMEOUT: &str = "PROVIDER_TIMEOUT_SECS";
pub const ENV_PROVIDER_USER_AGENT: &str = "PROVIDER_USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("no {0} given")]
    Empty(&'static str),

    #[error(transparent)]
    UnknownDataType(#[from] UnknownDataType),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
}

/// Which relational store the pipeline writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(()),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Schema searched when introspecting PostgreSQL tables.
    pub schema: String,
    /// SQLite database file. Must already exist.
    pub path: PathBuf,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            host: "localhost".into(),
            port: 5432,
            name: String::new(),
            user: String::new(),
            password: String::new(),
            schema: "public".into(),
            path: PathBuf::from("financial_data.db"),
            connect_timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("schema", &self.schema)
            .field("path", &self.path)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Points the config at an SQLite file and selects that backend.
    pub fn use_sqlite(&mut self, path: impl Into<PathBuf>) {
        self.backend = StoreBackend::Sqlite;
        self.path = path.into();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// News items requested per ticker.
    pub news_count: u32,
    /// How far back statement history is requested.
    pub history_years: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            news_count: 20,
            history_years: 10,
        }
    }
}

impl IngestConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|var| std::env::var(var).ok())
    }

    /// Overrides fields from `lookup`, which maps a variable name to its value.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let set = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(path) = set(ENV_DB_PATH) {
            self.database.use_sqlite(path.trim());
        }
        if let Some(host) = set(ENV_DB_HOST) {
            self.database.host = host.trim().to_string();
        }
        if let Some(port) = set(ENV_DB_PORT) {
            self.database.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_DB_PORT.into(),
                value: port.clone(),
            })?;
        }
        if let Some(name) = set(ENV_DB_NAME) {
            self.database.name = name.trim().to_string();
        }
        if let Some(user) = set(ENV_DB_USER) {
            self.database.user = user.trim().to_string();
        }
        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            self.database.password = password;
        }
        if let Some(backend) = set(ENV_DB_BACKEND) {
            self.database.backend = backend.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_DB_BACKEND.into(),
                value: backend.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_PROVIDER_TIMEOUT) {
            self.provider.timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_PROVIDER_TIMEOUT.into(),
                    value: value.clone(),
                })?;
        }
        if let Some(agent) = lookup(ENV_PROVIDER_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            self.provider.user_agent = agent;
        }
        Ok(())
    }
}

/// Splits comma-separated input, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Tickers from comma-separated input. Case is kept as given.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, ConfigError> {
    let tickers = split_list(input);
    if tickers.is_empty() {
        return Err(ConfigError::Empty("tickers"));
    }
    Ok(tickers)
}

/// Data types from comma-separated input; any unknown identifier is an error.
pub fn parse_data_types(input: &str) -> Result<Vec<DataType>, ConfigError> {
    let kinds = split_list(input)
        .iter()
        .map(|s| s.parse::<DataType>())
        .collect::<Result<Vec<_>, _>>()?;
    if kinds.is_empty() {
        return Err(ConfigError::Empty("data types"));
    }
    Ok(kinds)
}
