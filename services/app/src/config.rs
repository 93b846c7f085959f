//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use task_manager_core::ThemeRestorePolicy;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which key-value store backs the persistence gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("'{}' is not one of memory, file, sqlite", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub storage_path: PathBuf,
    pub database_url: String,
    pub log_level: Level,
    pub theme_restore_policy: ThemeRestorePolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = parse_var(&lookup, "STORAGE_BACKEND", "file")?;

        let storage_path = lookup("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/storage.json"));

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None if storage_backend == StorageBackend::Sqlite => {
                return Err(ConfigError::MissingVar("DATABASE_URL".to_string()))
            }
            None => String::new(),
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let theme_restore_policy = parse_var(&lookup, "THEME_RESTORE_POLICY", "raw-string")?;

        Ok(Self {
            storage_backend,
            storage_path,
            database_url,
            log_level,
            theme_restore_policy,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e))
}
