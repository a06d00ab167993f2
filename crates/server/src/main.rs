use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trawler_core::{
    load_config, load_config_from_env, validate_config, Config, CrawlLoop, DatabasePool,
    ItemProcessor, JackettSearcher, SqliteTorrentStore, TmdbClient, TorrentStore,
};
use trawler_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Trawler v{}", VERSION);

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Open the shared pool and the store on top of it
    let pool = Arc::new(
        DatabasePool::open(&config.database.path, config.database.max_connections)
            .context("Failed to open database")?,
    );
    let store = Arc::new(
        SqliteTorrentStore::new(Arc::clone(&pool)).context("Failed to initialize torrent store")?,
    );
    info!(
        "Torrent store initialized ({} max connections)",
        pool.max_connections()
    );

    // Start the crawl loop if enabled
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (monitor, crawl_handle) = if config.crawler.enabled {
        let catalog = Arc::new(
            TmdbClient::new(config.catalog.clone()).context("Failed to create TMDB client")?,
        );
        info!("Initializing Jackett searcher at {}", config.searcher.url);
        let searcher = Arc::new(
            JackettSearcher::new(config.searcher.clone())
                .context("Failed to create Jackett searcher")?,
        );

        let processor = Arc::new(ItemProcessor::new(
            catalog.clone(),
            searcher,
            store.clone() as Arc<dyn TorrentStore>,
        ));
        let crawl = CrawlLoop::new(config.crawler.clone(), catalog, processor);
        let monitor = crawl.monitor();

        info!(
            "Crawler started (language: {}, max pages: {}, concurrency: {})",
            config.crawler.language, config.crawler.max_pages, config.crawler.concurrency
        );
        let handle = tokio::spawn(crawl.run(shutdown_tx.subscribe()));
        (Some(monitor), Some(handle))
    } else {
        info!("Crawler disabled in config");
        (None, None)
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), store, monitor));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Stop the crawl loop before closing the pool
    if let Some(handle) = crawl_handle {
        info!("Stopping crawler...");
        let _ = shutdown_tx.send(());
        if let Err(e) = handle.await {
            warn!("Crawl loop task ended abnormally: {}", e);
        }
        info!("Crawler stopped");
    }

    pool.shutdown();
    info!("Database pool closed");

    Ok(())
}

/// Load config from `TRAWLER_CONFIG` (default `config.toml`), falling back to
/// defaults plus environment when the file does not exist.
fn load() -> Result<Config> {
    let config_path = std::env::var("TRAWLER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))
    } else {
        info!(
            "No config file at {:?}, using defaults and environment",
            config_path
        );
        load_config_from_env().context("Failed to load config from environment")
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
