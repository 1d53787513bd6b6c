//! Image CDN cache service
//!
//! Accepts a source image URL, downloads it, resizes it into small,
//! medium and large variants and serves the cached variants back over
//! HTTP.

mod auth;
mod cache;
mod error;
mod fetch;
mod resize;
mod server;
mod store;
mod types;

use crate::cache::VariantCache;
use crate::error::{CdnError, Result};
use crate::fetch::ImageFetcher;
use crate::server::{start_server, ServerState, SharedState};
use crate::store::VariantStore;
use crate::types::ServiceConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("imgcdn_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting imgcdn server...");

    let config = load_config()?;
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("In-memory storage: {}", config.store_in_memory);
    info!(
        "Max cache size: {} MB",
        config.max_cache_size / (1024 * 1024)
    );
    info!("Entry TTL: {} seconds", config.ttl_secs);

    let store = if config.store_in_memory {
        VariantStore::memory()
    } else {
        VariantStore::disk(config.cache_dir.clone())
    };

    let cache = VariantCache::new(store, config.max_cache_size, config.ttl_secs);
    cache.init().await?;

    let fetcher = ImageFetcher::new();

    let state: SharedState = Arc::new(ServerState::new(cache, fetcher, config.api_token));

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| CdnError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

fn load_config() -> Result<ServiceConfig> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let api_token = std::env::var("API_TOKEN")
        .map_err(|_| CdnError::Config("API_TOKEN must be set".to_string()))?;

    let cache_dir = std::env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./cache_data"));

    let store_in_memory = std::env::var("STORE_IN_MEMORY")
        .map(|v| v == "true")
        .unwrap_or(false);

    let max_cache_size = std::env::var("MAX_CACHE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1024 * 1024 * 1024); // 1GB default

    let ttl_secs = std::env::var("EXPIRATION_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(3600 * 24 * 365); // 1 year default

    Ok(ServiceConfig {
        port,
        api_token,
        cache_dir,
        store_in_memory,
        max_cache_size,
        ttl_secs,
    })
}
