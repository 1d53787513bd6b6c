//! Error types for the image CDN cache service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum CdnError {
    Unauthorized,
    BadRequest(String),
    NotFound,
    Upstream(String),
    Decode(String),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for CdnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdnError::Unauthorized => write!(f, "Authentication required"),
            CdnError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            CdnError::NotFound => write!(f, "Not found"),
            CdnError::Upstream(msg) => write!(f, "Upstream fetch error: {}", msg),
            CdnError::Decode(msg) => write!(f, "Image decode error: {}", msg),
            CdnError::Io(err) => write!(f, "IO error: {}", err),
            CdnError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CdnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CdnError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CdnError {
    fn from(err: std::io::Error) -> Self {
        CdnError::Io(Box::new(err))
    }
}

impl From<reqwest::Error> for CdnError {
    fn from(err: reqwest::Error) -> Self {
        CdnError::Upstream(err.to_string())
    }
}

impl From<image::ImageError> for CdnError {
    fn from(err: image::ImageError) -> Self {
        CdnError::Decode(err.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for CdnError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        CdnError::Config(err.to_string())
    }
}

impl IntoResponse for CdnError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CdnError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".into()),
            CdnError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            CdnError::NotFound => (StatusCode::NOT_FOUND, "File not found".into()),
            CdnError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream fetch failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch image from URL".into(),
                )
            }
            CdnError::Decode(msg) => {
                tracing::warn!(error = %msg, "Image decode failed");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Source is not a decodable image".into(),
                )
            }
            CdnError::Io(err) => {
                tracing::error!(error = %err, "IO error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            CdnError::Config(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CdnError>;
