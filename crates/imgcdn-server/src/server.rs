//! HTTP server for the image CDN cache
//!
//! Provides /cache_url, /cache_data/{*path}, and /health endpoints.

use crate::auth::Authorized;
use crate::cache::VariantCache;
use crate::error::{CdnError, Result};
use crate::fetch::{source_path, ImageFetcher};
use crate::resize::make_variants;
use crate::types::{CacheUrlResponse, HealthResponse, SizeClass};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

/// Route prefix the cached variant paths are served under
pub const CACHE_ROUTE_PREFIX: &str = "cache_data";

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: VariantCache,
    pub fetcher: ImageFetcher,
    pub api_token: String,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: VariantCache, fetcher: ImageFetcher, api_token: String) -> Self {
        Self {
            cache,
            fetcher,
            api_token,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

#[derive(Debug, Deserialize)]
struct CacheUrlQuery {
    #[serde(default)]
    overwrite: bool,
}

#[derive(Debug, Deserialize)]
struct CacheUrlForm {
    #[serde(default)]
    url: String,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cache_url", post(cache_url))
        .route("/cache_data/{*path}", get(serve_variant))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

/// Cache a source image: download, resize into all size classes, store.
///
/// With `overwrite=false` a source whose variants are all fresh is
/// answered from the cache without touching the upstream.
async fn cache_url(
    State(state): State<SharedState>,
    _auth: Authorized,
    Query(query): Query<CacheUrlQuery>,
    Form(form): Form<CacheUrlForm>,
) -> Result<Json<CacheUrlResponse>> {
    if form.url.is_empty() {
        return Err(CdnError::BadRequest("Missing URL parameter".to_string()));
    }

    let source = source_path(&form.url)?;
    let keys: Vec<String> = SizeClass::ALL
        .iter()
        .map(|s| s.variant_key(&source))
        .collect();

    if !query.overwrite {
        let mut all_fresh = true;
        for key in &keys {
            if !state.cache.is_fresh(key).await {
                all_fresh = false;
                break;
            }
        }
        if all_fresh {
            debug!(url = %form.url, "All variants fresh, answering from cache");
            return Ok(Json(CacheUrlResponse {
                message: "Image already cached".to_string(),
                cached_urls: public_urls(&keys),
            }));
        }
    }

    let (data, upstream_type) = state.fetcher.fetch(&form.url).await?;
    let variants = make_variants(&data)?;

    // Variants carry the sniffed format; a mislabeling upstream is
    // tolerated but worth a trace
    if let Some(first) = variants.first() {
        if upstream_type != first.content_type {
            debug!(
                upstream = %upstream_type,
                sniffed = first.content_type,
                url = %form.url,
                "Upstream content type differs from sniffed format"
            );
        }
    }

    for variant in &variants {
        let key = variant.size.variant_key(&source);
        state
            .cache
            .put(&key, &variant.data, variant.content_type)
            .await?;
    }

    info!(url = %form.url, variants = variants.len(), "Image cached and resized");

    Ok(Json(CacheUrlResponse {
        message: "Image cached and resized successfully".to_string(),
        cached_urls: public_urls(&keys),
    }))
}

fn public_urls(keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|k| format!("{}/{}", CACHE_ROUTE_PREFIX, k))
        .collect()
}

/// Serve a cached variant by its path
async fn serve_variant(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> Result<Response> {
    // Variant keys never contain dot segments; anything else is hostile
    if path.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return Err(CdnError::BadRequest("Invalid cache path".to_string()));
    }

    let (data, content_type) = state.cache.get(&path).await.ok_or(CdnError::NotFound)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
