//! Unified error handling for the backend API.
//!
//! Handlers return `ApiResult<T>` and use `?`; every variant maps to an HTTP
//! status and a JSON `{ "error": ..., "details": ... }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use canteen_shared::ErrorResponse;
use thiserror::Error;

use crate::notifications::NotificationError;

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database connection pool error
    #[error("Database connection error")]
    ConnectionPool(#[source] diesel_async::pooled_connection::deadpool::PoolError),

    /// Database query error
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Data access or other upstream failure
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request field validation failed
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Request conflicts with current state (e.g. selections are locked)
    #[error("{0}")]
    Conflict(String),

    /// Authentication required but not provided or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted to access resource
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ConnectionPool(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for ApiError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        ApiError::ConnectionPool(err)
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Store(e) => ApiError::Internal(e),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::ConnectionPool(e) => {
                tracing::error!("Connection pool error: {:?}", e);
                ErrorResponse::new("Database connection unavailable")
            }
            ApiError::Database(diesel::result::Error::NotFound) => {
                ErrorResponse::new("Resource not found")
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ErrorResponse::new("Database operation failed")
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ErrorResponse::with_details("Internal server error", e.to_string())
            }
            ApiError::NotFound(resource) => ErrorResponse::new(format!("{} not found", resource)),
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) => ErrorResponse::new(msg.clone()),
            ApiError::Validation(e) => {
                ErrorResponse::with_details("Invalid request", e.to_string())
            }
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => {
                ErrorResponse::new(msg.clone())
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("locked").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::not_found("Menu").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Database(diesel::result::Error::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("upstream")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_empty_broadcast_is_bad_request() {
        let err = ApiError::from(NotificationError::EmptyMessage);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request: Message content is required.");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::not_found("Daily menu").to_string(), "Daily menu not found");
    }
}
