//! services/app/src/adapters/sqlite.rs
//!
//! This module contains the sqlite adapter, a concrete implementation of the
//! `PersistenceGateway` port from the `core` crate. Every key is one row of the
//! `kv_store` table.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use task_manager_core::ports::{PersistenceGateway, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `PersistenceGateway` port.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Creates a new `SqliteStorage` over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url`, creating the database file if it is missing.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct EntryRecord {
    value: String,
}

fn db_error(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `PersistenceGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl PersistenceGateway for SqliteStorage {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let record = sqlx::query_as::<_, EntryRecord>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(record.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for (key, value) in pairs {
            sqlx::query(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2) \
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            )
            .bind(key.as_str())
            .bind(value.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)
    }

    async fn multi_remove(&self, keys: &[String]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                .bind(key.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_storage() -> (SqliteStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("app.db").display());
        let storage = SqliteStorage::connect(&url).await.unwrap();
        storage.run_migrations().await.unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let (storage, _temp_dir) = create_test_storage().await;

        storage.set("tasks", "[]").await.unwrap();
        storage.set("tasks", r#"[{"id":"1"}]"#).await.unwrap();

        assert_eq!(
            storage.get("tasks").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[tokio::test]
    async fn batched_writes_and_removes() {
        let (storage, _temp_dir) = create_test_storage().await;

        storage
            .multi_set(&[
                ("token".to_string(), "mock-jwt-token".to_string()),
                ("user".to_string(), "{}".to_string()),
            ])
            .await
            .unwrap();
        assert_eq!(storage.get("user").await.unwrap().as_deref(), Some("{}"));

        storage
            .multi_remove(&["token".to_string(), "user".to_string()])
            .await
            .unwrap();
        assert_eq!(storage.get("token").await.unwrap(), None);
        assert_eq!(storage.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let (storage, _temp_dir) = create_test_storage().await;
        storage.run_migrations().await.unwrap();
        assert_eq!(storage.get("theme").await.unwrap(), None);
    }
}
