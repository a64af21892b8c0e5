use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {message}")]
    ValidationError { field: Option<String>, message: String },

    #[error("Conflict: {message}")]
    Conflict { field: Option<String>, message: String },

    #[error("Stale write: {0}")]
    StaleWrite(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::StaleWrite(_) => StatusCode::PRECONDITION_FAILED,
        }
    }

    pub fn body(&self) -> Value {
        let (message, field) = match self {
            AppError::NotFound(msg)
            | AppError::Database(msg)
            | AppError::StaleWrite(msg) => (msg, None),
            AppError::ValidationError { field, message } => (message, field.as_ref()),
            AppError::Conflict { field, message } => (message, field.as_ref()),
        };

        match field {
            Some(field) => json!({ "error": message, "field": field }),
            None => json!({ "error": message }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, self);
        } else {
            tracing::debug!("Error: {}: {}", status, self);
        }

        (status, Json(self.body())).into_response()
    }
}
