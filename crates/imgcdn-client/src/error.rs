//! Error types for the imgcdn client

use std::fmt;

/// Errors that can occur when talking to the imgcdn service
#[derive(Debug)]
pub enum ImgcdnError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Service responded with a non-success status
    Status(u16),
}

impl fmt::Display for ImgcdnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "imgcdn HTTP error: {}", e),
            Self::Status(code) => write!(f, "imgcdn service returned status {}", code),
        }
    }
}

impl std::error::Error for ImgcdnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for ImgcdnError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for imgcdn client operations
pub type Result<T> = std::result::Result<T, ImgcdnError>;
