//! Error types for Biblio server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Bulk creation failed")]
    BulkCreate(Vec<BulkItemError>),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A single failed item in an all-or-nothing bulk create.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemError {
    pub index: usize,
    pub error: String,
}

/// Error response body: fixed `{error, message, detail}` envelope.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub detail: Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, detail) = match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                msg,
                json!("Invalid input data provided"),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                msg,
                json!("HTTP 404 error occurred"),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "Conflict",
                "Data conflict occurred".to_string(),
                json!(msg),
            ),
            AppError::BulkCreate(errors) => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                "Bulk creation failed".to_string(),
                json!({ "errors": errors }),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Database operation failed".to_string(),
                    json!("An internal database error occurred"),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal server error".to_string(),
                    json!("An internal error occurred"),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            detail,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // Unique-constraint violations (duplicate join rows under a race)
        // surface as conflicts, everything else is a storage failure.
        match e.as_database_error() {
            Some(dbe) if dbe.is_unique_violation() => AppError::Conflict(dbe.message().to_string()),
            _ => AppError::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let messages: Vec<String> = fields
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();

        AppError::Validation(messages.join("; "))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization failed: {}", e))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
