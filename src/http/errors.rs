//! # HTTP Errors
//!
//! Transport-level errors and their status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::response::{respond, ApiResponse, CachePolicy};
use crate::auth::{AuthError, Operation, Role};
use crate::query::QueryError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Presented token was rejected and the operation needs more than anonymous access
    #[error("{0}")]
    Auth(AuthError),

    #[error("Authentication required to {0}")]
    AuthenticationRequired(Operation),

    #[error("Role '{role}' may not {operation}")]
    Forbidden { operation: Operation, role: Role },

    #[error("Exam {0} not found")]
    NotFound(i64),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ==================
    // Query layer
    // ==================
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Auth(err) => err.code(),
            ApiError::AuthenticationRequired(_) => "AUTH_REQUIRED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidParam(_) => "INVALID_PARAMETER",
            ApiError::InvalidBody(_) => "INVALID_BODY",
            ApiError::Query(err) => err.code(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            ApiError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidParam(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::SearchFailed { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Query(QueryError::Persistence(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        respond(
            status,
            CachePolicy::NoStore,
            ApiResponse::error(self.to_string(), self.code()),
        )
    }
}
