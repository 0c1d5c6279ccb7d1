// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::repository::RepositoryError> for ApiError {
    fn from(err: crate::database::repository::RepositoryError) -> Self {
        match err {
            crate::database::repository::RepositoryError::NotFound(msg) => {
                ApiError::not_found(msg)
            }
            crate::database::repository::RepositoryError::Connection(_) => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            crate::database::repository::RepositoryError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(err: crate::storage::StorageError) -> Self {
        match err {
            crate::storage::StorageError::ObjectNotFound(key) => {
                ApiError::not_found(format!("Stored object {} not found", key))
            }
            crate::storage::StorageError::Transport(e) => {
                tracing::error!("Object store transport error: {}", e);
                ApiError::bad_gateway("Object storage unavailable")
            }
            crate::storage::StorageError::Rejected { status, body } => {
                tracing::error!("Object store rejected request: {} {}", status, body);
                ApiError::bad_gateway("Object storage rejected the request")
            }
            crate::storage::StorageError::InvalidLocator(msg) => {
                tracing::error!("Invalid object locator: {}", msg);
                ApiError::internal_server_error("Failed to build object locator")
            }
        }
    }
}

impl From<crate::services::person_service::PersonServiceError> for ApiError {
    fn from(err: crate::services::person_service::PersonServiceError) -> Self {
        use crate::services::person_service::PersonServiceError;

        match err {
            PersonServiceError::Validation(msg) => ApiError::bad_request(msg),
            PersonServiceError::NotOwner => {
                ApiError::forbidden("Person belongs to another user")
            }
            PersonServiceError::PersonNotFound => ApiError::not_found("Person not found"),
            PersonServiceError::OwnerMissing(id) => {
                tracing::error!("Token user {} has no User record", id);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            PersonServiceError::Repository(e) => e.into(),
            PersonServiceError::Storage(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
