//! services/app/src/adapters/file.rs
//!
//! A `PersistenceGateway` that keeps every key in a single JSON object file.
//! The whole file is rewritten on each write via a temporary file and an
//! atomic rename, so a crash mid-write leaves the previous contents intact.
//! A file that does not parse is moved to `*.json.corrupt` and the store
//! starts empty.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use task_manager_core::ports::{PersistenceGateway, PortError, PortResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, info};

type Entries = BTreeMap<String, String>;

/// A file-backed key-value adapter that implements the `PersistenceGateway` port.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStorage {
    /// Opens the store at `path`, creating parent directories as needed.
    /// A missing or empty file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let entries = load(&path).await?;
        info!(path = %path.display(), keys = entries.len(), "Opened file storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` and writes the result to disk. The in-memory copy is
    /// only updated once the file has been replaced.
    async fn update<F>(&self, change: F) -> PortResult<()>
    where
        F: FnOnce(&mut Entries) + Send,
    {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        change(&mut next);
        save(&self.path, &next).await?;
        *entries = next;
        Ok(())
    }
}

async fn load(path: &Path) -> PortResult<Entries> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
        Err(e) => return Err(io_error(e)),
    };
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    match serde_json::from_str(&content) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            let aside = path.with_extension("json.corrupt");
            error!(
                path = %path.display(),
                moved_to = %aside.display(),
                error = %e,
                "Storage file is corrupt; starting empty"
            );
            tokio::fs::rename(path, &aside).await.map_err(io_error)?;
            Ok(Entries::new())
        }
    }
}

async fn save(path: &Path, entries: &Entries) -> PortResult<()> {
    let json = serde_json::to_vec_pretty(entries).map_err(|e| PortError::Serialization {
        key: path.display().to_string(),
        message: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&tmp_path).await.map_err(io_error)?;
    file.write_all(&json).await.map_err(io_error)?;
    file.sync_all().await.map_err(io_error)?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await.map_err(io_error)
}

fn io_error(e: std::io::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

#[async_trait]
impl PersistenceGateway for FileStorage {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let key = key.to_string();
        self.update(move |entries| {
            entries.remove(&key);
        })
        .await
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> PortResult<()> {
        let pairs = pairs.to_vec();
        self.update(move |entries| entries.extend(pairs)).await
    }

    async fn multi_remove(&self, keys: &[String]) -> PortResult<()> {
        let keys = keys.to_vec();
        self.update(move |entries| {
            for key in &keys {
                entries.remove(key);
            }
        })
        .await
    }
}
