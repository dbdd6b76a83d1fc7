use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::validation::Rejection;

/// Message sent to clients for any failure whose detail must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Message sent when the request is not declared as JSON.
pub const CONTENT_TYPE_MESSAGE: &str = "Content-Type debe ser application/json";

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Request without a JSON content type.
    UnsupportedContentType(Option<String>),
    /// Body that could not be decoded into a candidate record.
    MalformedBody(serde_json::Error),
    /// Candidate failed one of the field checks.
    Validation(Rejection),
    /// Candidate collides with an already stored lead.
    Conflict(Rejection),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnsupportedContentType(Some(ct)) => {
                write!(f, "Unsupported content type: {}", ct)
            }
            AppError::UnsupportedContentType(None) => write!(f, "Missing content type"),
            AppError::MalformedBody(e) => write!(f, "Malformed request body: {}", e),
            AppError::Validation(reason) => write!(f, "Validation failed: {}", reason),
            AppError::Conflict(reason) => write!(f, "Conflict: {}", reason),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and a
    /// `{"success": false, "error": ...}` body. Internal detail is only logged.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::UnsupportedContentType(ct) => {
                tracing::warn!("Rejected lead submission with content type {:?}", ct);
                (StatusCode::BAD_REQUEST, CONTENT_TYPE_MESSAGE.to_string())
            }
            AppError::MalformedBody(e) => {
                tracing::error!("Error processing lead: malformed body: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Validation(reason) => {
                tracing::warn!("Lead rejected: {}", reason);
                (StatusCode::BAD_REQUEST, reason.client_message())
            }
            AppError::Conflict(reason) => {
                tracing::warn!("Lead rejected: {}", reason);
                (StatusCode::CONFLICT, reason.client_message())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<Rejection> for AppError {
    /// Duplicates become conflicts; every other rejection is a validation failure.
    fn from(reason: Rejection) -> Self {
        match reason {
            Rejection::Duplicate => AppError::Conflict(reason),
            other => AppError::Validation(other),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedBody(err)
    }
}
