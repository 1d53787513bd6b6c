//! Source URL validation and image downloading

use crate::error::{CdnError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Source file extensions the service will cache
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Derive the cache-relative source path from an image URL.
///
/// The path component is percent-decoded and stripped of its leading `/`;
/// it becomes the suffix of every variant key. Rejects non-http(s)
/// schemes, paths without an allowed image extension, and paths that
/// could escape the cache directory.
pub fn source_path(raw: &str) -> Result<String> {
    let parsed =
        Url::parse(raw).map_err(|e| CdnError::BadRequest(format!("Invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CdnError::BadRequest(format!(
                "Unsupported URL scheme: {}",
                other
            )))
        }
    }

    let decoded = urlencoding::decode(parsed.path())
        .map_err(|e| CdnError::BadRequest(format!("Invalid URL encoding: {}", e)))?;
    let path = decoded.trim_start_matches('/').to_string();

    if path.is_empty() || path.ends_with('/') {
        return Err(CdnError::BadRequest(
            "URL has no file name to cache".to_string(),
        ));
    }

    // The decoded path becomes a storage key; keep it inside the cache dir
    if path.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return Err(CdnError::BadRequest("Invalid URL path".to_string()));
    }

    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CdnError::BadRequest(format!(
            "Unsupported file extension: .{}",
            extension
        )));
    }

    Ok(path)
}

/// HTTP client for downloading source images
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// Create a new fetcher with default settings (30 second timeout)
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new fetcher with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Download a source image, returning its bytes and content type
    pub async fn fetch(&self, url: &str) -> Result<(Vec<u8>, String)> {
        debug!(url = %url, "Downloading source image");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Source returned error status");
            return Err(CdnError::Upstream(format!(
                "source returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = response.bytes().await?.to_vec();

        debug!(
            size = data.len(),
            content_type = %content_type,
            "Downloaded source image"
        );

        Ok((data, content_type))
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}
