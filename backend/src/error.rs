//! Application error taxonomy and its mapping onto HTTP responses.
//!
//! Every store operation returns `Result<_, AppError>`. Storage-engine errors
//! are converted at the operation boundary through `From<rusqlite::Error>`, so
//! raw SQLite failures never reach a client.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use rusqlite::ffi;
use serde_json::{json, Map, Value};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input or a schema violation. `details` maps the offending
    /// input names to what is wrong with them.
    #[error("{message}")]
    Validation {
        message: String,
        details: Map<String, Value>,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// The storage engine refused a write because of a foreign-key reference.
    #[error("{0}")]
    Referential(String),
    #[error("rendering did not finish within {0:?}")]
    RenderTimeout(Duration),
    #[error("rendering failed: {0}")]
    Render(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Map<String, Value>) -> Self {
        AppError::Validation {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable name of the error kind, sent as `error`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "ValidationError",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Referential(_) => "ReferentialError",
            AppError::RenderTimeout(_) => "RenderTimeout",
            AppError::Render(_) => "RenderError",
            AppError::Internal(_) => "InternalError",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Render(_) => "An internal error occurred during PDF generation.".to_string(),
            other => other.to_string(),
        }
    }

    /// Logs the error under the operation tag and hands it back, for use in
    /// `map_err` at the HTTP boundary.
    pub fn log(self, operation: &str) -> Self {
        if self.status_code().is_server_error() {
            error!("[{}] {}: {}", operation, self.code(), self);
        } else {
            warn!("[{}] {}: {}", operation, self.code(), self);
        }
        self
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Referential(_) => StatusCode::CONFLICT,
            AppError::RenderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "error": self.code(),
            "message": self.public_message(),
        });
        if let AppError::Validation { details, .. } = self {
            if !details.is_empty() {
                body["details"] = Value::Object(details.clone());
            }
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return AppError::Conflict(format!("Unique constraint violated: {}", detail));
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return AppError::Referential(format!("Foreign key constraint violated: {}", detail));
                }
                _ => {}
            }
        }
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON encoding failed: {}", err))
    }
}
