//! Client identification utilities
//!
//! Pulls caller credentials out of HTTP headers.

use axum::http::{HeaderMap, header};

/// Error when extracting a bearer token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Authorization header missing")]
    MissingHeader,
    #[error("Token missing")]
    MissingToken,
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// ## Returns
/// * `Err(BearerError::MissingHeader)` - no Authorization header at all
/// * `Err(BearerError::MissingToken)` - header present but no token after the scheme
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::MissingHeader)?;

    let value = value.to_str().map_err(|_| BearerError::MissingToken)?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(BearerError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::MissingToken);
    }

    parts
        .next()
        .map(str::to_string)
        .ok_or(BearerError::MissingToken)
}

/// True if the request carries any Authorization header.
pub fn has_authorization(headers: &HeaderMap) -> bool {
    headers.contains_key(header::AUTHORIZATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = with_auth("Bearer eyJhbGciOi.payload.sig");
        assert_eq!(
            extract_bearer_token(&headers),
            Ok("eyJhbGciOi.payload.sig".to_string())
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let headers = with_auth("bearer tok");
        assert_eq!(extract_bearer_token(&headers), Ok("tok".to_string()));
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_bearer_token(&headers),
            Err(BearerError::MissingHeader)
        );
        assert!(!has_authorization(&headers));
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(
            extract_bearer_token(&with_auth("Bearer")),
            Err(BearerError::MissingToken)
        );
        assert_eq!(
            extract_bearer_token(&with_auth("Basic dXNlcjpwYXNz")),
            Err(BearerError::MissingToken)
        );
    }
}
