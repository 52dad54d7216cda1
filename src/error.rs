//! Error types for the Vidmatch server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Failed to decode base64 main video: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("Invalid isBigUrlDone value: {0} (expected 0, 1 or 2)")]
    InvalidPhase(i64),

    #[error("Received the final part of a split payload without its first part")]
    MissingFirstPhase,

    #[error("Videos are not fully downloaded")]
    DownloadsIncomplete,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Error encoding response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::InvalidPayload(_)
            | Self::InvalidPhase(_)
            | Self::MissingFirstPhase
            | Self::DownloadsIncomplete => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Encode(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::InvalidPhase(_) => "invalid_phase",
            Self::MissingFirstPhase => "missing_first_phase",
            Self::DownloadsIncomplete => "downloads_incomplete",
            Self::SessionNotFound(_) => "not_found",
            Self::Encode(_) => "encoding_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(code = self.code(), "Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
