// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed, missing or oversized input (400).
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Well-formed input that breaks a field constraint (422).
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    #[error("Authorization header missing")]
    MissingCredential,

    #[error("Invalid or expired token")]
    InvalidCredential,

    /// Login failure; deliberately the same for unknown user and wrong password.
    #[error("Username or password is incorrect")]
    InvalidCredentials,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Password must be at least {0} characters long")]
    WeakPassword(usize),

    #[error("Requested todo does not exist")]
    NotFound,

    #[error("User doesn't have permission")]
    Forbidden,

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AppError::MissingCredential => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            AppError::InvalidCredential => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AppError::DuplicateUsername => (StatusCode::BAD_REQUEST, "USERNAME_EXISTS"),
            AppError::WeakPassword(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "TODO_NOT_FOUND"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "UNAUTHORIZED_ACCESS"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

/// JSON error response body: `{"error": {"code", "message"}}`
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Validation(msg) | AppError::Unprocessable(msg) => msg.clone(),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "An internal error occurred".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
