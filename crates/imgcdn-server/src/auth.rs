//! Bearer-token authentication for the cache API

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use crate::error::CdnError;
use crate::server::SharedState;

/// Pull the bearer token out of the `Authorization` header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Proof that the request carried the configured API token.
///
/// Use this as a handler parameter to require authentication:
///
/// ```ignore
/// async fn my_handler(_auth: Authorized, ...) -> Result<..., CdnError> { ... }
/// ```
pub struct Authorized;

impl FromRequestParts<SharedState> for Authorized {
    type Rejection = CdnError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(CdnError::Unauthorized)?;
        if token != state.api_token {
            return Err(CdnError::Unauthorized);
        }
        Ok(Authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer 123456789"),
        );
        assert_eq!(bearer_token(&headers), Some("123456789"));
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);
    }
}
