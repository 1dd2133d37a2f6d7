/// Error handling for the API server
///
/// Provides a unified error type that maps to HTTP responses. Handlers
/// return `Result<T, ApiError>`, which converts to a structured JSON body
/// `{error, message, details?}` with the matching status code.
///
/// Validation and authorization failures are raised before any mutation, so
/// an error response never leaves partial state behind. Internal details
/// are logged but not exposed to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskboard_shared::auth::jwt::JwtError;
use taskboard_shared::auth::password::PasswordError;
use taskboard_shared::models::task::DueDateError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Invalid due-date string (400)
    InvalidDueDate(String),

    /// Missing credential (401)
    Unauthorized(String),

    /// Credential present but signature/expiry invalid (401)
    InvalidToken(String),

    /// Authenticated but denied by policy (403)
    Forbidden(String),

    /// Referenced entity absent (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Signup field constraints violated (422)
    ValidationFailed(Vec<ValidationErrorDetail>),

    /// One of the concurrent dashboard queries errored (500)
    DashboardQueryFailed(String),

    /// Unclassified store error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind (e.g. "forbidden", "invalid_due_date")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::InvalidDueDate(msg) => write!(f, "Invalid due date: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationFailed(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::DashboardQueryFailed(msg) => {
                write!(f, "Dashboard query failed: {}", msg)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_kind, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::InvalidDueDate(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_due_date", msg, None)
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "invalid_token", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationFailed(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::DashboardQueryFailed(msg) => {
                tracing::error!("Dashboard query failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "dashboard_query_failed",
                    "Failed to load dashboard".to_string(),
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                // Log internal errors, don't leak details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_kind.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique-constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert identity token errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::InvalidToken("Token expired".to_string()),
            JwtError::Invalid(msg) => ApiError::InvalidToken(msg),
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert due-date parse failures to API errors
impl From<DueDateError> for ApiError {
    fn from(err: DueDateError) -> Self {
        ApiError::InvalidDueDate(err.to_string())
    }
}

/// Convert validator failures into the structured detail list
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationFailed(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Forbidden("Not allowed to delete this task".to_string());
        assert_eq!(err.to_string(), "Forbidden: Not allowed to delete this task");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_due_date_error_maps_to_invalid_due_date() {
        let err: ApiError = DueDateError::Unparseable("2025-12-25".to_string()).into();
        assert!(matches!(err, ApiError::InvalidDueDate(_)));
    }

    #[test]
    fn test_expired_token_maps_to_invalid_token() {
        let err: ApiError = JwtError::Expired.into();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationFailed(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
