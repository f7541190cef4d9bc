use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shelf_core::error::{CoreError, PersistenceError};

use crate::validation::FieldError;

/// Message returned for every sanitized 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `shelf_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Itemized input validation failures.
    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The store refused a create. Reported to the client with details.
    #[error("Failed to create item: {0}")]
    CreateFailed(PersistenceError),
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        AppError::Core(CoreError::Persistence(err))
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, %id, "Entity not found");
                    (
                        StatusCode::NOT_FOUND,
                        json!({ "error": format!("{entity} not found") }),
                    )
                }
                CoreError::Persistence(err) => {
                    tracing::error!(error = %err, "Store failure");
                    internal_error()
                }
            },

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            AppError::CreateFailed(err) => {
                tracing::warn!(error = %err, "Item create rejected by store");
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Failed to create item",
                        "details": err.to_string(),
                    }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": INTERNAL_ERROR_MESSAGE }),
    )
}
