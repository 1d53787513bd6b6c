//! imgcdn service HTTP client

use crate::error::{ImgcdnError, Result};
use crate::types::CacheUrlResponse;
use std::time::Duration;
use tracing::{error, warn};

/// Pick the first cached path carrying the `/{size}_` token.
///
/// Cached paths embed the size label of the variant they point at
/// (`cache_data/large_photos/...`); this is the selection convention the
/// service's consumers rely on.
pub fn select_variant<'a>(paths: &'a [String], size: &str) -> Option<&'a str> {
    let token = format!("/{}_", size);
    paths
        .iter()
        .find(|p| p.contains(&token))
        .map(|s| s.as_str())
}

/// Client for the imgcdn image caching service
///
/// Wraps the `POST /cache_url` endpoint and the size-variant selection
/// convention used by display components.
pub struct ImgcdnClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ImgcdnClient {
    /// Create a new client with default settings (30 second timeout)
    ///
    /// # Arguments
    /// * `base_url` - Service root, e.g. `http://localhost:8080`
    /// * `token` - Bearer token the service was configured with
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_timeout(base_url, token, Duration::from_secs(30))
    }

    /// Create a new client with a custom timeout
    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Ask the service to cache a source image and return the variant paths
    ///
    /// # Arguments
    /// * `image_url` - Source image URL to cache
    /// * `overwrite` - Force a refetch even when variants are already cached
    pub async fn cache_url(&self, image_url: &str, overwrite: bool) -> Result<CacheUrlResponse> {
        let url = format!("{}/cache_url?overwrite={}", self.base_url, overwrite);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .form(&[("url", image_url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImgcdnError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Resolve the display URL for a source image at a given size.
    ///
    /// Issues one `cache_url` request and scans the result for the
    /// requested size token. Any failure (request error, non-success
    /// status, no matching variant) is logged and reported as `None`;
    /// nothing is retried.
    pub async fn display_url(&self, image_url: &str, size: &str) -> Option<String> {
        match self.cache_url(image_url, false).await {
            Ok(response) => match select_variant(&response.cached_urls, size) {
                Some(path) => Some(format!("{}/{}", self.base_url, path)),
                None => {
                    warn!(url = image_url, size, "No cached variant for requested size");
                    None
                }
            },
            Err(e) => {
                error!(error = %e, url = image_url, "Error caching image");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached_paths() -> Vec<String> {
        vec![
            "cache_data/small_photos/1089930/pexels-photo.jpeg".to_string(),
            "cache_data/medium_photos/1089930/pexels-photo.jpeg".to_string(),
            "cache_data/large_photos/1089930/pexels-photo.jpeg".to_string(),
        ]
    }

    #[test]
    fn test_select_variant_picks_matching_entry() {
        let paths = cached_paths();
        assert_eq!(
            select_variant(&paths, "large"),
            Some("cache_data/large_photos/1089930/pexels-photo.jpeg")
        );
        assert_eq!(
            select_variant(&paths, "small"),
            Some("cache_data/small_photos/1089930/pexels-photo.jpeg")
        );
    }

    #[test]
    fn test_select_variant_no_match() {
        let paths = cached_paths();
        assert_eq!(select_variant(&paths, "thumbnail"), None);
        assert_eq!(select_variant(&[], "large"), None);
    }

    #[test]
    fn test_select_variant_requires_token_boundary() {
        // "large" as a bare substring must not match; only "/large_" does
        let paths = vec!["cache_data/enlarged/photo.jpeg".to_string()];
        assert_eq!(select_variant(&paths, "large"), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ImgcdnClient::new("http://localhost:8080/", "token");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_display_url_unreachable_service_is_none() {
        // Nothing listens on the discard port; the request fails and the
        // adapter reports unavailability instead of propagating
        let client = ImgcdnClient::with_timeout(
            "http://127.0.0.1:9",
            "token",
            Duration::from_secs(2),
        );

        let url = client
            .display_url("https://example.com/photo.jpg", "large")
            .await;
        assert!(url.is_none());
    }
}
