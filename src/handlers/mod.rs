// src/handlers/mod.rs
pub mod complaint_handler;
pub mod driver_handler;
pub mod ride_handler;
pub mod settings_handler;
pub mod settlement_handler;
pub mod user_handler;

use axum::http::{HeaderMap, header};

use crate::errors::{DispatchError, DispatchResult};

/// Pull the session token out of the Authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> DispatchResult<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(|| DispatchError::unauthorized("missing bearer token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc-123"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc-123");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(bearer_token(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&headers).is_err());
    }
}
