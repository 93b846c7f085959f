//! crates/task_manager_core/src/write_through.rs
//!
//! The write-through port between the stores and the persistence gateway.
//!
//! Stores hand writes to a `WriteThrough` and return immediately. A single
//! background task applies them to the gateway in submission order. Failed
//! writes are logged and dropped; the in-memory state stays authoritative.
//! `flush` resolves once every write submitted before it has been applied.

use crate::ports::PersistenceGateway;
use crate::schema::StorageKey;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum WriteOp {
    Set(StorageKey, String),
    MultiSet(Vec<(StorageKey, String)>),
    Remove(Vec<StorageKey>),
    Flush(oneshot::Sender<()>),
}

/// Cheap to clone; all clones feed the same background writer.
#[derive(Clone)]
pub struct WriteThrough {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl WriteThrough {
    /// Starts the background writer for `gateway`.
    ///
    /// Must be called from within a Tokio runtime. The writer stops once every
    /// clone of the returned handle has been dropped.
    pub fn spawn(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(gateway, rx));
        Self { tx }
    }

    pub fn set(&self, key: StorageKey, value: String) {
        self.submit(WriteOp::Set(key, value));
    }

    /// Writes all pairs in one gateway call.
    pub fn multi_set(&self, pairs: Vec<(StorageKey, String)>) {
        self.submit(WriteOp::MultiSet(pairs));
    }

    pub fn remove(&self, keys: &[StorageKey]) {
        self.submit(WriteOp::Remove(keys.to_vec()));
    }

    /// Waits until all previously submitted writes have reached the gateway.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.submit(WriteOp::Flush(done_tx));
        // A closed channel means the writer is gone and nothing is pending.
        let _ = done_rx.await;
    }

    fn submit(&self, op: WriteOp) {
        if self.tx.send(op).is_err() {
            warn!("Storage writer has stopped; dropping write");
        }
    }
}

async fn run_writer(gateway: Arc<dyn PersistenceGateway>, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    while let Some(op) = rx.recv().await {
        let (label, result) = match op {
            WriteOp::Set(key, value) => (key.to_string(), gateway.set(key.as_str(), &value).await),
            WriteOp::MultiSet(pairs) => {
                let label = join_keys(pairs.iter().map(|(k, _)| *k));
                let pairs: Vec<(String, String)> = pairs
                    .into_iter()
                    .map(|(k, v)| (k.as_str().to_string(), v))
                    .collect();
                (label, gateway.multi_set(&pairs).await)
            }
            WriteOp::Remove(keys) => {
                let label = join_keys(keys.iter().copied());
                let keys: Vec<String> = keys.iter().map(|k| k.as_str().to_string()).collect();
                (label, gateway.multi_remove(&keys).await)
            }
            WriteOp::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        match result {
            Ok(()) => debug!(keys = %label, "Storage write applied"),
            Err(e) => warn!(keys = %label, error = %e, "Storage write failed; dropping it"),
        }
    }
    debug!("Storage writer stopped");
}

fn join_keys(keys: impl Iterator<Item = StorageKey>) -> String {
    keys.map(|k| k.as_str()).collect::<Vec<_>>().join(",")
}
