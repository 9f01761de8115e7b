//! Caller-facing error taxonomy and its HTTP rendering.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::auth::extractors::AuthError;
use crate::auth::jwt::TokenError;
use crate::db::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unknown email and wrong password both land here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large.".to_string(),
            ),
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed with server fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Config(msg) => AppError::Config(msg),
            other => AppError::Forbidden(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(msg) => AppError::Unauthenticated(msg.to_string()),
            AuthError::Forbidden(token_err) => token_err.into(),
        }
    }
}

/// Body rejections keep their status class but never echo parser output.
fn body_rejected(status: StatusCode, detail: &str, message: &str) -> AppError {
    warn!(%status, error = %detail, "request body rejected");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(message.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        body_rejected(
            rejection.status(),
            &rejection.body_text(),
            "Request body must be valid JSON.",
        )
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        body_rejected(
            rejection.status(),
            &rejection.body_text(),
            "Request body must be multipart/form-data.",
        )
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        body_rejected(err.status(), &err.body_text(), "Malformed multipart body.")
    }
}
