use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use cohort::config::Config;
use cohort::feed::{self, ChangeBroadcaster, FileWatcher};
use cohort::server::{create_router, AppState};
use cohort::store::{FileStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize the record store
    let store = FileStore::new(&config.store.db_path);
    if !std::path::Path::new(&config.store.db_path).exists() {
        info!("Creating empty record database at {}", config.store.db_path);
        store.replace(Vec::new()).await?;
    }

    // Watch the database file and broadcast debounced change events
    let feed = ChangeBroadcaster::with_window(config.store.feed_debounce());
    let watcher = FileWatcher::new(&config.store.db_path, config.store.watch_interval());
    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let _feed_task = feed::drive(watcher, feed.clone(), shutdown_rx);

    // Build the router
    let state = Arc::new(AppState {
        store: Arc::new(store),
        feed,
        latency: config.server.latency(),
    });
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Record store listening on http://{}", addr);
    info!("📡 Change feed available at http://{}/events", addr);
    if let Some(latency) = config.server.latency() {
        info!("Simulating {:?} of response latency", latency);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
