//! Error types for the OCR gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::OcrError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Request not found or expired: {0}")]
    NotFoundOrExpired(String),

    #[error("Request is already being processed: {0}")]
    AlreadyProcessing(String),

    #[error("Admission queue is full ({depth} pending requests)")]
    QueueFull { depth: usize },

    #[error("OCR failed: {0}")]
    Adapter(#[from] OcrError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Stable machine-checkable kind reported in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::PayloadTooLarge { .. } => "payload_too_large",
            AppError::NotFoundOrExpired(_) => "not_found_or_expired",
            AppError::AlreadyProcessing(_) => "already_processing",
            AppError::QueueFull { .. } => "queue_full",
            AppError::Adapter(_) => "adapter_failure",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFoundOrExpired(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyProcessing(_) => StatusCode::CONFLICT,
            AppError::QueueFull { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Adapter(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Adapter(e) => {
                tracing::error!("OCR adapter failure: {}", e);
                "OCR processing failed".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (self.status_code(), body).into_response()
    }
}
