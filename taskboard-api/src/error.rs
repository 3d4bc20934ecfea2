/// Error handling for the API server
///
/// JSON pages and the health probe return `Result<T, ApiError>`, which maps
/// to a status code and an [`ErrorResponse`] body. Form handlers never
/// surface an `ApiError`; they turn domain errors into a notice with
/// [`user_message`] and redirect.
///
/// # Example
///
/// ```
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("Page not found".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::Error;
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
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
    /// Error code (e.g., "bad_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::InternalError(msg) => {
                // Details stay in the log
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::DuplicateEmail | Error::DuplicateUsername => ApiError::Conflict(err.to_string()),
            Error::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            Error::Unauthorized => ApiError::Forbidden(err.to_string()),
            Error::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            Error::WrongCurrentPassword | Error::PasswordMismatch => {
                ApiError::BadRequest(err.to_string())
            }
            Error::Storage(_) | Error::Password(_) | Error::Session(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

/// Flattens `validator` output into per-field details, sorted by field
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
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

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// First validation message, for a single-line notice
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    validation_details(errors)
        .into_iter()
        .next()
        .map(|d| d.message)
        .unwrap_or_else(|| "Validation failed".to_string())
}

/// Text shown to the user when a form submission fails
///
/// Storage failures get a generic message; the detail goes to the log.
pub fn user_message(err: &Error) -> String {
    match err {
        Error::Storage(_) | Error::Password(_) | Error::Session(_) => {
            tracing::error!(error = %err, "Request failed");
            "Something went wrong, please try again".to_string()
        }
        Error::NotFound(what) => format!("{} not found", capitalize(what)),
        other => other.to_string(),
    }
}

/// Storage failure reason fit for a notice
///
/// Keeps the first line of the driver message, without the `Database error:`
/// prefix, capped at [`MAX_REASON_CHARS`] characters.
pub fn storage_reason(reason: &str) -> String {
    let line = reason.lines().next().unwrap_or_default().trim();
    let line = line.strip_prefix("Database error:").unwrap_or(line).trim();

    if line.is_empty() {
        return "unknown error".to_string();
    }
    if line.chars().count() > MAX_REASON_CHARS {
        let cut: String = line.chars().take(MAX_REASON_CHARS).collect();
        return format!("{}...", cut);
    }
    line.to_string()
}

const MAX_REASON_CHARS: usize = 120;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(email(message = "Invalid email format"))]
        email: String,

        #[validate(length(min = 1, message = "Username is required"))]
        username: String,
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Page not found".to_string());
        assert_eq!(err.to_string(), "Not found: Page not found");
    }

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let status = |err: Error| ApiError::from(err).into_response().status();

        assert_eq!(status(Error::DuplicateEmail), StatusCode::CONFLICT);
        assert_eq!(status(Error::NotFound("task")), StatusCode::NOT_FOUND);
        assert_eq!(status(Error::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(status(Error::validation("Title")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(Error::Storage("connection reset".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details_sorted_by_field() {
        let form = Form {
            email: "not-an-email".to_string(),
            username: String::new(),
        };
        let errors = form.validate().unwrap_err();

        let details = validation_details(&errors);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "email");
        assert_eq!(first_validation_message(&errors), "Invalid email format");
    }

    #[test]
    fn test_user_message_hides_storage_details() {
        let msg = user_message(&Error::Storage("password=secret".to_string()));
        assert!(!msg.contains("secret"));

        assert_eq!(user_message(&Error::NotFound("task")), "Task not found");
        assert_eq!(
            user_message(&Error::DuplicateUsername),
            "Username is already taken"
        );
    }

    #[test]
    fn test_storage_reason_keeps_first_line() {
        assert_eq!(
            storage_reason("Database error: check constraint users_email_not_empty violated\nDETAIL: row"),
            "check constraint users_email_not_empty violated"
        );
        assert_eq!(storage_reason(""), "unknown error");

        let long = "x".repeat(500);
        assert_eq!(storage_reason(&long).chars().count(), MAX_REASON_CHARS + 3);
    }
}
