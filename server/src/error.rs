//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_engine::Error as EngineError;
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Engine(e) => match e {
                EngineError::SourceUnavailable(reason) => {
                    tracing::warn!("Catalog source unavailable: {}", reason);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Failed to fetch products from the remote catalog".to_string(),
                        Some(reason.clone()),
                    )
                }
                EngineError::SyncInProgress => (StatusCode::CONFLICT, e.to_string(), None),
                EngineError::StoreWriteFailed { .. } | EngineError::StoreQueryFailed(_) => {
                    tracing::error!("Store error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Store error".to_string(),
                        Some(e.to_string()),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();
        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (
                AppError::Engine(EngineError::SourceUnavailable("timeout".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Engine(EngineError::SyncInProgress),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Engine(EngineError::write_failed(1, "boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Engine(EngineError::StoreQueryFailed("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::BadRequest("Conditions are required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound("Product 9 not found".into()),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn source_failure_carries_details() {
        let err = AppError::Engine(EngineError::SourceUnavailable("HTTP 503".into()));
        let (_, message, details) = err.parts();
        assert_eq!(message, "Failed to fetch products from the remote catalog");
        assert_eq!(details.as_deref(), Some("HTTP 503"));
    }
}
