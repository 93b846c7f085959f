//! services/app/src/error.rs
//!
//! Defines the primary error type for the app service.

use crate::config::ConfigError;
use task_manager_core::ports::PortError;

/// The primary error type for the `app` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the persistence port.
    #[error("Storage Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to run the embedded database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
