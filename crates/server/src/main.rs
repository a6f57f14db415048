mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pramen_core::{
    load_config, validate_config, CacheBackend, CinemetaClient, HttpPageFetcher,
    LayeredMetadataProvider, MemoryCache, MetadataProvider, NoopCache, PageFetcher, ResultCache,
    SearchClient, SqliteCache, StreamExtractor, StreamResolver, TmdbClient,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Interval between expired-cache-entry sweeps
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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

    // Determine config path
    let config_path = std::env::var("PRAMEN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Index mirrors: {:?}", config.index.mirrors);
    info!("Cache backend: {:?}", config.cache.backend);

    // Config hash ties log lines of a running instance to an exact config
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Starting pramen {} (config {})", VERSION, &config_hash[..16]);

    // Shared page fetcher for search and detail pages
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(config.index.clone()));

    // Result cache
    let ttl = Duration::from_secs(config.cache.ttl_secs);
    let cache: Arc<dyn ResultCache> = match config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(ttl)),
        CacheBackend::Sqlite => Arc::new(
            SqliteCache::new(&config.cache.path, ttl)
                .context("Failed to open cache database")?,
        ),
        CacheBackend::Disabled => Arc::new(NoopCache),
    };
    info!("Result cache initialized");

    // Metadata provider: Cinemeta, refined by TMDB when configured
    let cinemeta = CinemetaClient::new(
        config.metadata.cinemeta_url.clone(),
        config.metadata.timeout_secs,
    )
    .context("Failed to create Cinemeta client")?;
    let tmdb = match &config.metadata.tmdb {
        Some(tmdb_config) => {
            info!("TMDB title refinement enabled");
            Some(
                TmdbClient::new(tmdb_config.clone(), config.metadata.timeout_secs)
                    .context("Failed to create TMDB client")?,
            )
        }
        None => None,
    };
    let metadata: Arc<dyn MetadataProvider> =
        Arc::new(LayeredMetadataProvider::new(cinemeta, tmdb));

    // Resolution engine
    let search = SearchClient::new(
        Arc::clone(&fetcher),
        Arc::clone(&cache),
        config.index.search_path.clone(),
    );
    let extractor = StreamExtractor::new(Arc::clone(&fetcher), Arc::clone(&cache));
    let resolver = StreamResolver::new(config.resolver.clone(), metadata, search, extractor);

    // Periodic purge keeps expired cache rows from piling up
    let purge_cache = Arc::clone(&cache);
    let purge_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
        // The first tick completes immediately; skip it so sweeps start
        // one full interval after boot.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match purge_cache.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired cache entries"),
                Err(e) => warn!("Cache purge failed: {}", e),
            }
        }
    });

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), resolver));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);
    info!("Addon manifest at http://{}/manifest.json", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    purge_handle.abort();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
