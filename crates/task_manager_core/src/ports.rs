//! crates/task_manager_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The persistence gateway is the only boundary the stores touch, which keeps
//! them independent of the concrete key-value backend.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from storage backends (files, sqlite, ...).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Serialization error for key '{key}': {message}")]
    Serialization { key: String, message: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Async key-value storage used for durability across restarts.
///
/// Values are raw strings; the key layout and JSON encoding are defined in `schema.rs`.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;

    /// Reads several keys at once. Results come back in the order of `keys`.
    async fn multi_get(&self, keys: &[&str]) -> PortResult<Vec<(String, Option<String>)>> {
        let reads = keys.iter().map(|key| async move {
            self.get(key).await.map(|value| (key.to_string(), value))
        });
        futures::future::try_join_all(reads).await
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> PortResult<()> {
        for (key, value) in pairs {
            self.set(key, value).await?;
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> PortResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
