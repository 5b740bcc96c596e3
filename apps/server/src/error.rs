//! API error types and HTTP mapping.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError / DbError / EngineError                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError { status, code, message }                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  {"success": false, "error": {"code": "...", "message": "..."}}         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `code` is a stable machine-readable kind clients branch on; `message`
//! is human-readable and names the offending entity.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use medipos_core::CoreError;
use medipos_db::{DbError, EngineError};

/// An API-level error carrying its HTTP status and stable error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_INPUT",
            message: message.into(),
        }
    }

    /// Missing or invalid credentials (401).
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    /// Authenticated but not permitted (403).
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::FORBIDDEN,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            code: "CONFLICT",
            message: message.into(),
        }
    }

    pub fn insufficient_stock(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            code: "INSUFFICIENT_STOCK",
            message: message.into(),
        }
    }

    pub fn storage_failure(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "STORAGE_FAILURE",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, message = %self.message, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::CustomerNotFound(_) | CoreError::ProductNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            CoreError::InsufficientStock { .. } => ApiError::insufficient_stock(err.to_string()),
            CoreError::EmptyOrder | CoreError::Validation(_) => {
                ApiError::invalid_input(err.to_string())
            }
            CoreError::Unauthorized { .. } => ApiError::forbidden(err.to_string()),
        }
    }
}

impl From<medipos_core::ValidationError> for ApiError {
    fn from(err: medipos_core::ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::invalid_input(err.to_string()),
            // Internal detail stays out of client responses
            _ => ApiError::storage_failure("A storage operation failed"),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Db(e) => e.into(),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_stable_codes() {
        let err = ApiError::from(CoreError::CustomerNotFound("c1".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "NOT_FOUND");

        let err = ApiError::from(CoreError::InsufficientStock {
            name: "Paracetamol".to_string(),
            available: 2,
            requested: 5,
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "INSUFFICIENT_STOCK");
        assert!(err.message.contains("Paracetamol"));

        let err = ApiError::from(CoreError::EmptyOrder);
        assert_eq!(err.code, "INVALID_INPUT");
    }

    #[test]
    fn db_internals_are_not_leaked() {
        let err = ApiError::from(DbError::Internal("secret path /var/db".to_string()));
        assert_eq!(err.code, "STORAGE_FAILURE");
        assert!(!err.message.contains("/var/db"));
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        let err = ApiError::from(DbError::duplicate("phone", "0300123"));
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "CONFLICT");
    }
}
