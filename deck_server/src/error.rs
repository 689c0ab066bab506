//! Error types for deck_server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use deck_common::ValidationError;
use thiserror::Error;

use crate::posts::PostError;
use crate::web::ApiResponse;

/// Key-value store failures, across all backends
#[derive(Debug, Error)]
pub enum KvError {
    /// HTTP request to the REST store failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// REST store answered with an HTTP error status
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// REST store reported a command error
    #[error("Key-value store error: {0}")]
    Remote(String),
    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Reply did not have the expected shape
    #[error("Unexpected reply: {0}")]
    Decode(String),
    #[error("Key-value store lock poisoned")]
    Poisoned,
}

pub type KvResult<T> = std::result::Result<T, KvError>;

/// Deck storage failures (files and cache)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Deck not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Kv(#[from] KvError),
}

/// Result alias for deck storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Configuration problems detected before the server starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--kv rest requires --kv-rest-url (or KV_REST_API_URL)")]
    MissingRestUrl,
    #[error("--kv rest requires --kv-rest-token (or KV_REST_API_TOKEN)")]
    MissingRestToken,
    #[error("Port must not be 0")]
    InvalidPort,
}

/// Request failure, rendered as the `{success: false, error}` envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => ApiError::NotFound(format!("Deck not found: {}", name)),
            StoreError::Invalid(e) => ApiError::Validation(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        let message = err.to_string();
        match err {
            PostError::NotFound(_) | PostError::NotLiked(_) => ApiError::NotFound(message),
            PostError::AlreadyPosted(_) | PostError::AlreadyLiked(_) => ApiError::Conflict(message),
            PostError::NotOwner(_) => ApiError::Unauthorized(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => {
                log::debug!("Request failed with {}: {}", status, other);
                other.to_string()
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_common::Issue;

    #[test]
    fn store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound("spanish".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Deck not found: spanish");
    }

    #[test]
    fn store_validation_maps_to_400() {
        let validation = ValidationError {
            issues: vec![Issue {
                path: "title".to_string(),
                message: "must not be empty".to_string(),
            }],
        };
        let err: ApiError = StoreError::Invalid(validation).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("title: must not be empty"));
    }

    #[test]
    fn kv_failures_map_to_500() {
        let err: ApiError = StoreError::Kv(KvError::Remote("WRONGTYPE".to_string())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn post_errors_map_to_taxonomy() {
        assert_eq!(
            ApiError::from(PostError::AlreadyLiked("p1".to_string())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(PostError::NotOwner("p1".to_string())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(PostError::NotLiked("p1".to_string())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
