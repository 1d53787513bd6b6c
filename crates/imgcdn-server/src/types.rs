//! Core types for the image CDN cache service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Size classes a source image is resized into.
///
/// Each class caps the longer edge of the variant; smaller sources are
/// never enlarged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// All size classes, in the order variants are generated and returned.
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    /// Maximum edge length in pixels for this class
    pub fn max_dimension(self) -> u32 {
        match self {
            SizeClass::Small => 320,
            SizeClass::Medium => 640,
            SizeClass::Large => 1280,
        }
    }

    /// The label used as the size token in cached paths
    pub fn label(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }

    /// Cache key for this class over a source path: `{size}_{source_path}`
    pub fn variant_key(self, source_path: &str) -> String {
        format!("{}_{}", self.label(), source_path)
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata for a cached variant entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Configuration for the service, loaded from the environment
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub api_token: String,
    pub cache_dir: PathBuf,
    pub store_in_memory: bool,
    pub max_cache_size: u64,
    pub ttl_secs: u64,
}

/// Response body for `POST /cache_url`
#[derive(Debug, Serialize)]
pub struct CacheUrlResponse {
    pub message: String,
    #[serde(rename = "cachedUrls")]
    pub cached_urls: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_dimensions() {
        assert_eq!(SizeClass::Small.max_dimension(), 320);
        assert_eq!(SizeClass::Medium.max_dimension(), 640);
        assert_eq!(SizeClass::Large.max_dimension(), 1280);
    }

    #[test]
    fn test_variant_key_carries_size_token() {
        let key = SizeClass::Large.variant_key("photos/1089930/pexels-photo.jpeg");
        assert_eq!(key, "large_photos/1089930/pexels-photo.jpeg");
        // The public path `cache_data/{key}` must contain the `/{size}_` token
        assert!(format!("cache_data/{}", key).contains("/large_"));
    }

    #[test]
    fn test_cache_url_response_uses_camel_case() {
        let response = CacheUrlResponse {
            message: "Image cached and resized successfully".to_string(),
            cached_urls: vec!["cache_data/small_a.jpg".to_string()],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("cachedUrls"));
        assert!(!json.contains("cached_urls"));
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_entry_serialization() {
        let entry = CacheEntry {
            content_type: "image/jpeg".to_string(),
            size: 12345,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("image/jpeg"));
        assert!(json.contains("12345"));

        let deserialized: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content_type, entry.content_type);
        assert_eq!(deserialized.size, entry.size);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            uptime_secs: 3600,
            cache: CacheStats {
                entries: 100,
                total_size: 50_000_000,
                hits: 500,
                misses: 50,
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
        assert!(json.contains("3600"));
        assert!(json.contains("500"));
    }
}
