// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{auth_gateway::AuthError, hire::HireError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Auth { message: String, code: String },
    #[error("authentication service is not available")]
    AuthUnavailable,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unavailable => AppError::AuthUnavailable,
            other => AppError::Auth {
                message: other.friendly_message().to_string(),
                code: other.code().to_string(),
            },
        }
    }
}

impl From<HireError> for AppError {
    fn from(err: HireError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Auth { message, code } => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message, "code": code }))
            }
            AppError::AuthUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": self.to_string() }))
            }
        };
        tracing::debug!(%status, error = %self, "request failed");
        (status, Json(body)).into_response()
    }
}
