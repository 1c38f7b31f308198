use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use filebox::{
    AppState, BlobStore, Config, Database, JobQueue, SqliteJobQueue, ThumbnailWorker, WebServer,
};

fn load_config() -> Config {
    let path = std::env::var("FILEBOX_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();

    if let Err(e) = filebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filebox::logging::init_console_only(&config.logging.level);
    }

    config.validate()?;

    info!("Filebox API server");
    info!(
        "Server configured on {}:{}",
        config.web.host, config.web.port
    );

    let db = Database::open(&config.database.path).await?;
    let blobs = BlobStore::new(&config.files.storage_path);
    let jobs: Arc<dyn JobQueue> = Arc::new(SqliteJobQueue::new(db.pool().clone()));
    info!("Blob storage at {}", config.files.storage_path);

    let state = Arc::new(AppState::new(
        db.clone(),
        blobs,
        jobs.clone(),
        Duration::from_secs(config.session.ttl_secs),
    ));

    let (stop_tx, stop_rx) = watch::channel(false);
    let worker = if config.worker.embedded {
        let worker = ThumbnailWorker::new(
            state.catalog.clone(),
            jobs,
            Duration::from_millis(config.worker.poll_interval_ms),
        );
        Some(tokio::spawn(async move { worker.run(stop_rx).await }))
    } else {
        info!("Embedded thumbnail worker disabled; run filebox-worker separately");
        None
    };

    let server = WebServer::new(&config, state)?;
    let result = server.run(shutdown_signal()).await;

    let _ = stop_tx.send(true);
    if let Some(worker) = worker {
        if let Err(e) = worker.await {
            error!(error = %e, "Thumbnail worker task failed");
        }
    }
    db.close().await;
    info!("Filebox stopped");

    result.map_err(Into::into)
}
