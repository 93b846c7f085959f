//! crates/task_manager_core/src/memory.rs
//!
//! An in-process `PersistenceGateway`. Backs the `memory` storage backend and
//! serves as the test double for the stores.

use crate::ports::{PersistenceGateway, PortResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-populated with `entries`, e.g. to simulate a previous run.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            writes: AtomicUsize::new(0),
        }
    }

    /// A copy of everything currently stored.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().await.clone()
    }

    /// Number of write calls (`set`, `remove`, `multi_*`) received so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistenceGateway for MemoryStorage {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.record_write();
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.record_write();
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> PortResult<Vec<(String, Option<String>)>> {
        let entries = self.entries.lock().await;
        Ok(keys
            .iter()
            .map(|key| (key.to_string(), entries.get(*key).cloned()))
            .collect())
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> PortResult<()> {
        self.record_write();
        let mut entries = self.entries.lock().await;
        for (key, value) in pairs {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> PortResult<()> {
        self.record_write();
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn multi_get_reports_missing_keys_in_request_order() {
        let storage = MemoryStorage::with_entries([("theme", "true")]);

        let values = storage.multi_get(&["systemTheme", "theme"]).await.unwrap();

        assert_eq!(
            values,
            vec![
                ("systemTheme".to_string(), None),
                ("theme".to_string(), Some("true".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn removing_an_absent_key_is_fine() {
        let storage = MemoryStorage::new();
        storage.remove("token").await.unwrap();
        assert_eq!(storage.write_count(), 1);
        assert!(storage.snapshot().await.is_empty());
    }
}
