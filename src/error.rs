//! Error types for the REST API.

use crate::auth::AuthError;
use crate::gate::GateError;
use crate::store::{BackupError, StoreError};
use axum::Json;
use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;


/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No bearer token was presented.
    #[error("Not authenticated")]
    MissingToken,

    /// Login rejected.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Token expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token could not be validated.
    #[error("Invalid token")]
    InvalidToken,

    /// Record already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backup slot is empty.
    #[error("No backup available")]
    NoBackupAvailable,

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The store lock could not be acquired in time.
    #[error("Store busy: {0}")]
    LockTimeout(String),

    /// Backing file I/O or format failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            ApiError::DuplicateKey(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_KEY"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::NoBackupAvailable => (StatusCode::NOT_FOUND, "NO_BACKUP_AVAILABLE"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::LockTimeout(_) => (StatusCode::SERVICE_UNAVAILABLE, "LOCK_TIMEOUT"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::TokenExpired => ApiError::TokenExpired,
            AuthError::TokenMalformed => ApiError::InvalidToken,
            AuthError::InvalidSecret | AuthError::Encoding(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(user) => {
                ApiError::DuplicateKey(format!("record already exists for user {user}"))
            }
            StoreError::NotFound(user) => ApiError::NotFound(format!("no record for user {user}")),
            StoreError::InvalidRecord(reason) => ApiError::InvalidRequest(reason),
            StoreError::Backup(BackupError::NoBackupAvailable) => ApiError::NoBackupAvailable,
            err @ StoreError::LockTimeout { .. } => ApiError::LockTimeout(err.to_string()),
            err @ (StoreError::Io(_) | StoreError::Format(_) | StoreError::Backup(_)) => {
                ApiError::Storage(err.to_string())
            }
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Auth(err) => err.into(),
            GateError::Store(err) => err.into(),
            GateError::TaskFailed(reason) => ApiError::Internal(reason),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
