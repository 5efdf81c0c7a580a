//! # API Error Type
//!
//! Unified error type for REST handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Meridian CRM                           │
//! │                                                                         │
//! │  Handler / Workflow                                                     │
//! │        │                                                                │
//! │        ├── ValidationError  ──► 400 VALIDATION_ERROR                    │
//! │        ├── CoreError        ──► 400 DOMAIN_CONFLICT                     │
//! │        ├── DbError::NotFound──► 404 NOT_FOUND                           │
//! │        ├── DbError::Unique  ──► 409 CONFLICT                            │
//! │        ├── wrong role/owner ──► 403 FORBIDDEN                           │
//! │        ├── bad/missing JWT  ──► 401 UNAUTHORIZED                        │
//! │        └── anything else    ──► 500 INTERNAL                            │
//! │                                                                         │
//! │  Response body is always: { "code": "...", "message": "..." }          │
//! │  The client displays `message` directly.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use meridian_core::{CoreError, ValidationError};
use meridian_db::DbError;

/// API error returned from REST handlers.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Quotation not found: 1a2b3c"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Business rule conflict, e.g. illegal status transition (400)
    DomainConflict,

    /// Missing or invalid bearer token (401)
    Unauthorized,

    /// Wrong role or wrong owner (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Duplicate resource (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// 400 validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// 400 domain conflict.
    pub fn domain_conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::DomainConflict, message)
    }

    /// 401 unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// 403 forbidden.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// 404 not found for a given entity type and id.
    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
    }

    /// 500 internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Maps the error code onto an HTTP status.
    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::DomainConflict => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Conversions from Lower Layers
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ApiError::validation(v.to_string()),
            other => ApiError::domain_conflict(other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::Conflict, err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            other => ApiError::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::domain_conflict("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Deal", "1").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_found("Quotation", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Quotation not found: abc");

        let err: ApiError = DbError::duplicate("email", "a@b.com").into();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_core_error_mapping() {
        use meridian_core::QuotationStatus;

        let err: ApiError = meridian_core::CoreError::AlreadyInStatus {
            status: QuotationStatus::Approved,
        }
        .into();
        assert_eq!(err.code, ErrorCode::DomainConflict);
        assert_eq!(err.message, "Quotation is already approved");
    }
}
