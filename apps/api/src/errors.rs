use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every body carries `retryable` so clients can tell "fix your input"
/// from "try again later".
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    /// Classifies a multipart read failure. `limit` is the configured body
    /// limit, reported back when the upload overran it.
    pub fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { limit }
        } else {
            AppError::Validation(format!("Malformed upload: {}", err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, retryable) = match &self {
            AppError::Validation(msg)
            | AppError::Pipeline(PipelineError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR".to_string(),
                msg.clone(),
                false,
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE".to_string(),
                format!("Upload is too large. The limit is {limit} bytes."),
                false,
            ),
            AppError::Pipeline(PipelineError::Network(msg)) => {
                tracing::error!("Analysis service unreachable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "NETWORK_ERROR".to_string(),
                    "The analysis service could not be reached. Please try again later."
                        .to_string(),
                    true,
                )
            }
            AppError::Pipeline(PipelineError::Remote { code, message }) => {
                tracing::error!("Analysis service error {code}: {message}");
                (StatusCode::BAD_GATEWAY, code.clone(), message.clone(), true)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": retryable
            }
        }));

        (status, body).into_response()
    }
}
