//! Wire types for the imgcdn service

use serde::Deserialize;

/// Response from `POST /cache_url`
#[derive(Debug, Clone, Deserialize)]
pub struct CacheUrlResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "cachedUrls")]
    pub cached_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_url_response_deserialization() {
        let json = r#"{
            "message": "Image cached and resized successfully",
            "cachedUrls": [
                "cache_data/small_photos/1089930/pexels-photo.jpeg",
                "cache_data/medium_photos/1089930/pexels-photo.jpeg",
                "cache_data/large_photos/1089930/pexels-photo.jpeg"
            ]
        }"#;

        let response: CacheUrlResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.cached_urls.len(), 3);
        assert!(response.message.unwrap().contains("cached"));
    }

    #[test]
    fn test_message_is_optional() {
        let json = r#"{ "cachedUrls": [] }"#;
        let response: CacheUrlResponse = serde_json::from_str(json).unwrap();
        assert!(response.message.is_none());
        assert!(response.cached_urls.is_empty());
    }
}
