//! # API Errors
//!
//! Maps versioning failures and malformed requests onto HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::versioning::{ErrorKind, VersionError};

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// `X-User-Id` header absent
    #[error("Missing required header: X-User-Id")]
    MissingUser,

    /// `X-User-Id` header is not a UUID
    #[error("Invalid X-User-Id header: {0}")]
    InvalidUser(String),

    /// Path or query value that does not parse
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParam { name: &'static str, value: String },

    /// Body that is not JSON or does not match the request shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Query string that does not match the expected parameters
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The blocking task running the operation did not complete
    #[error("Internal error: {0}")]
    Internal(String),

    // ==================
    // Engine
    // ==================
    #[error("{0}")]
    Version(#[from] VersionError),
}

impl ApiError {
    pub fn invalid_param(name: &'static str, value: impl Into<String>) -> Self {
        ApiError::InvalidParam {
            name,
            value: value.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingUser
            | ApiError::InvalidUser(_)
            | ApiError::InvalidParam { .. }
            | ApiError::InvalidBody(_)
            | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Version(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidState => StatusCode::CONFLICT,
                ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
                ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });
        (status, body).into_response()
    }
}
