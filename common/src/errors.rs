//! Application error types.
//!
//! Defines the error taxonomy shared by all handlers and services.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::{ApiError, ApiResponse};

/// Convenience alias for results carrying an [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error taxonomy.
///
/// Only not-found and has-dependents conditions receive special handling
/// in the controllers; everything else propagates to the response mapping
/// below.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested entity id has no matching document.
    #[error("{0} not found")]
    NotFound(String),

    /// The supplied id is not a well-formed ObjectId; it cannot match any
    /// document, so it is surfaced like a miss.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// One or more field rules were violated; no write was performed.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Delete refused because live dependents still reference the entity.
    #[error("{0} still has dependent records")]
    DeleteBlocked(String),

    /// Underlying persistence failure. Propagated, never retried.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl AppError {
    /// Stable error code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) | AppError::InvalidId(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DeleteBlocked(_) => "DELETE_BLOCKED",
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::InvalidId(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DeleteBlocked(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Raw store errors are logged server-side and replaced with a
        // generic message in the response body.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "store operation failed");
                "internal error".to_string()
            }
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::InvalidId(_) => "record not found".to_string(),
            other => other.to_string(),
        };

        let details = match &self {
            AppError::Validation(messages) => Some(serde_json::json!(messages)),
            _ => None,
        };

        let body = ApiResponse::<()>::error(ApiError {
            code: self.code().to_string(),
            message,
            details,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::NotFound("Brand".into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_invalid_id_is_a_miss() {
        let err = AppError::InvalidId("zzz".into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let err = AppError::Validation(vec!["Name must be 3-100 characters".into()]);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_delete_blocked_maps_to_409() {
        let err = AppError::DeleteBlocked("Brand".into());
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
