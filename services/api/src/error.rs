//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, together with
//! its mapping onto HTTP responses. Every error renders as a JSON body of the
//! shape `{"detail": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use study_buddy_core::error::CoreError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the core engines or ports.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A request the client can fix (bad payload, malformed multipart, ...).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The request collides with existing state (email already registered).
    #[error("{0}")]
    Conflict(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The HTTP status each `CoreError` variant surfaces as.
fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::DocumentNotFound(_)
        | CoreError::NotFound(_)
        | CoreError::IndexNotFound(_)
        | CoreError::NoContent => StatusCode::NOT_FOUND,
        CoreError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        CoreError::EmptyDocument => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::GenerationFormat(_) | CoreError::Model(_) => StatusCode::BAD_GATEWAY,
        CoreError::AccessDenied => StatusCode::FORBIDDEN,
        CoreError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Core(core) => (core_status(core), self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Config(_) | ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                // Infrastructure details stay in the logs, not in the response.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_their_own_statuses() {
        assert_eq!(
            core_status(&CoreError::DocumentNotFound(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            core_status(&CoreError::UnsupportedFormat("text/csv".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            core_status(&CoreError::EmptyDocument),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            core_status(&CoreError::GenerationFormat("bad".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(core_status(&CoreError::AccessDenied), StatusCode::FORBIDDEN);
        assert_eq!(
            core_status(&CoreError::AuthenticationRequired),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            core_status(&CoreError::Store("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
