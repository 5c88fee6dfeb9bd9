use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog::{Vocabulary, admins::AdminStatus};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Critical,
}

/// One field-scoped problem with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: &'static str,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
            severity: Severity::Error,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<ValidationError>),

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Account is {}", .0.as_str())]
    AccountStatus(AdminStatus),

    #[error("{message}")]
    NotFound { field: &'static str, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn invalid(field: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationError::new(field, code, message)])
    }

    pub fn not_found(field: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            field,
            message: message.into(),
        }
    }

    pub fn internal(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::InternalError(error.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Duplicate(_)) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::AccountStatus(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn errors(self) -> Vec<ValidationError> {
        match self {
            AppError::Validation(errors) => errors,
            AppError::MalformedPayload => vec![ValidationError::new(
                "body",
                "invalid_type",
                "Request body must be valid JSON",
            )],
            AppError::Unauthorized(message) => {
                vec![ValidationError::new("authentication", "unauthorized", message)]
            }
            AppError::Forbidden(message) => {
                vec![ValidationError::new("authorization", "forbidden", message)]
            }
            AppError::AccountStatus(status) => {
                let message = match status {
                    AdminStatus::Suspended => "Your account has been suspended",
                    AdminStatus::Deleted => "This account has been deleted",
                    AdminStatus::Active => "Your account is active",
                };
                vec![ValidationError::new("status", "account_inactive", message)]
            }
            AppError::NotFound { field, message } => {
                vec![ValidationError::new(field, "not_found", message)]
            }
            AppError::Store(StoreError::Duplicate(field)) => vec![ValidationError::new(
                field.clone(),
                "duplicate",
                format!("{field} is already in use"),
            )],
            AppError::Store(_) | AppError::InternalError(_) => vec![ValidationError {
                field: "server".to_string(),
                message: "Internal server error".to_string(),
                code: "internal",
                severity: Severity::Critical,
            }],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "Request failed");
        }

        let body = json!({
            "success": false,
            "errors": self.errors(),
            "statusCode": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
