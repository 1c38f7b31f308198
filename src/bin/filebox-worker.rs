//! Standalone thumbnail worker.
//!
//! Consumes the job table of the same database the API server writes to.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use filebox::{BlobStore, Config, Database, FileCatalog, JobQueue, SqliteJobQueue, ThumbnailWorker};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::var("FILEBOX_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = Config::load(&path).unwrap_or_else(|e| {
        eprintln!("Failed to load {path}: {e}");
        eprintln!("Using default configuration.");
        Config::default()
    });
    config.apply_env_overrides();

    if let Err(e) = filebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filebox::logging::init_console_only(&config.logging.level);
    }
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let jobs: Arc<dyn JobQueue> = Arc::new(SqliteJobQueue::new(db.pool().clone()));
    let catalog = FileCatalog::new(
        db.pool().clone(),
        BlobStore::new(&config.files.storage_path),
        jobs.clone(),
    );
    let worker = ThumbnailWorker::new(
        catalog,
        jobs,
        Duration::from_millis(config.worker.poll_interval_ms),
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown signal received");
        let _ = stop_tx.send(true);
    });

    info!("Filebox thumbnail worker, database {}", config.database.path);
    worker.run(stop_rx).await;

    db.close().await;
    Ok(())
}
