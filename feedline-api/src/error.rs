/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers should return `Result<T, ApiError>` which automatically
/// converts to appropriate HTTP status codes.
///
/// Core errors are converted by their [`ErrorCategory`]:
///
/// | Category         | Status |
/// |------------------|--------|
/// | `Validation`     | 400    |
/// | `Authentication` | 401    |
/// | `NotFound`       | 404    |
/// | `Conflict`       | 409    |
/// | `Internal`       | 500    |
///
/// Every 401 carries the same body whatever the cause (unknown email, wrong
/// password, missing header, bad signature, expiry); the cause is logged.
///
/// # Example
///
/// ```
/// use feedline_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(text: String) -> ApiResult<Json<serde_json::Value>> {
///     if text.is_empty() {
///         return Err(ApiError::BadRequest("text is required".to_string()));
///     }
///     Ok(Json(json!({ "text": text })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feedline_shared::{
    auth::{
        credentials::CredentialError, middleware::AuthError, password::PasswordError,
        token::TokenError,
    },
    error::{ErrorCategory, StorageError},
    graph::FollowError,
    timeline::TimelineError,
    tweets::TweetError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Body of every 401 response
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing credentials";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401); the message is always [`UNAUTHORIZED_MESSAGE`]
    Unauthorized,

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email, self-follow
    Conflict(String),

    /// Field-level validation errors (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
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
    /// Error code (e.g., "bad_request", "unauthorized")
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
            ApiError::Unauthorized => write!(f, "Unauthorized: {}", UNAUTHORIZED_MESSAGE),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Maps a categorized core error onto an API error
    ///
    /// Authentication and internal errors are logged here because their
    /// messages never reach the client.
    fn categorized(category: ErrorCategory, err: &dyn std::error::Error) -> Self {
        match category {
            ErrorCategory::Validation => ApiError::BadRequest(err.to_string()),
            ErrorCategory::Authentication => {
                tracing::debug!(reason = %err, "Authentication rejected");
                ApiError::Unauthorized
            }
            ErrorCategory::Conflict => ApiError::Conflict(err.to_string()),
            ErrorCategory::NotFound => ApiError::NotFound(err.to_string()),
            ErrorCategory::Internal => ApiError::InternalError(err.to_string()),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized => ("unauthorized", UNAUTHORIZED_MESSAGE.to_string(), None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert request validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
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
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(errors)
    }
}

macro_rules! impl_from_categorized {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(err: $error) -> Self {
                    ApiError::categorized(err.category(), &err)
                }
            }
        )*
    };
}

impl_from_categorized!(
    AuthError,
    CredentialError,
    FollowError,
    PasswordError,
    StorageError,
    TimelineError,
    TokenError,
    TweetError,
);
