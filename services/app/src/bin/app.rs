//! services/app/src/bin/app.rs

use app_lib::{
    adapters::{FileStorage, MemoryStorage, SqliteStorage},
    config::{Config, StorageBackend},
    error::AppError,
    shell,
};
use std::sync::Arc;
use task_manager_core::{bootstrap, PersistenceGateway};
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(backend = ?config.storage_backend, "Configuration loaded. Starting app...");

    // --- 2. Open the Storage Backend ---
    let gateway: Arc<dyn PersistenceGateway> = match config.storage_backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(FileStorage::open(&config.storage_path).await?),
        StorageBackend::Sqlite => {
            info!("Connecting to database...");
            let storage = SqliteStorage::connect(&config.database_url).await?;
            info!("Running database migrations...");
            storage.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(storage)
        }
    };

    // --- 3. Restore Persisted State ---
    let mut store = bootstrap::hydrate(gateway, config.theme_restore_policy).await;

    // --- 4. Run the Command Shell ---
    println!("Task Manager. Type 'help' for commands.");
    shell::run(&mut store, BufReader::new(stdin()), stdout()).await?;
    info!("Shutting down.");

    Ok(())
}
