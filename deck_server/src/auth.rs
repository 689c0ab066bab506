//! Shared-secret check for the GPT action endpoints
//!
//! Accepts `Authorization: Bearer <key>` or `X-API-Key: <key>`.

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Pull the presented key out of the request headers
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim());
        }
    }

    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

/// Compare the presented key against the configured one in constant time
pub fn check_api_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        log::warn!("GPT request rejected: no API key configured");
        return Err(ApiError::Unauthorized("API key not configured".to_string()));
    };

    let Some(presented) = presented_key(headers) else {
        return Err(ApiError::Unauthorized("Missing API key".to_string()));
    };

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        log::warn!("GPT request rejected: invalid API key");
        Err(ApiError::Unauthorized("Invalid API key".to_string()))
    }
}
