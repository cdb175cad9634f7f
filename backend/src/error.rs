//! Error handling for the Stockroom inventory service
//!
//! Every error leaves the service as the standard envelope
//! `{ "success": false, "code": ..., "message": ..., "error"?: ... }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::reporting::AmountOverflow;
use shared::{PostingError, ValidationError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    // Business logic errors
    #[error("{0}")]
    InsufficientStock(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{} not found", resource))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::BadRequest(_)
            | AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorResponse {
        let (code, message, field, error) = match self {
            AppError::Validation { field, message } => {
                ("VALIDATION_ERROR", message.clone(), Some(field.clone()), None)
            }
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None, None),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone(), None, None),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None, None),
            AppError::InsufficientStock(msg) => ("INSUFFICIENT_STOCK", msg.clone(), None, None),
            AppError::DatabaseError(e) => (
                "DATABASE_ERROR",
                "Server Error".to_string(),
                None,
                Some(e.to_string()),
            ),
            AppError::Internal(msg) => (
                "INTERNAL_ERROR",
                "Server Error".to_string(),
                None,
                Some(msg.clone()),
            ),
            AppError::InternalError(e) => (
                "INTERNAL_ERROR",
                "Server Error".to_string(),
                None,
                Some(e.to_string()),
            ),
        };

        ErrorResponse {
            success: false,
            code,
            message,
            field,
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
            PostingError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            PostingError::StockOverflow { .. } | PostingError::CostOverflow { .. } => {
                AppError::Validation {
                    field: "items".to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<AmountOverflow> for AppError {
    fn from(err: AmountOverflow) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
