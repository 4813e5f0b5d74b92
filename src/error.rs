use axum::{Json, http::StatusCode, response::IntoResponse};
use bcrypt::BcryptError;
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PasskeepError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Password hashing error: {0}")]
    HashError(#[from] BcryptError),

    #[error("Blocking task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing caller identity")]
    MissingCreator,

    #[error("Invalid or missing API key")]
    Unauthorized,
}

impl PasskeepError {
    pub fn status(&self) -> StatusCode {
        match self {
            PasskeepError::DatabaseError(_)
            | PasskeepError::HashError(_)
            | PasskeepError::TaskError(_)
            | PasskeepError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PasskeepError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PasskeepError::MissingCreator | PasskeepError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for PasskeepError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = match self {
            // Storage and hashing failures stay opaque to the caller.
            PasskeepError::DatabaseError(_)
            | PasskeepError::HashError(_)
            | PasskeepError::TaskError(_)
            | PasskeepError::IoError(_) => ApiErrorBody {
                code: status.as_u16(),
                i18n: None,
                message: None,
            },
            PasskeepError::Validation(detail) => ApiErrorBody {
                code: status.as_u16(),
                i18n: Some("VALIDATION_ERROR"),
                message: Some(detail),
            },
            PasskeepError::MissingCreator => ApiErrorBody {
                code: status.as_u16(),
                i18n: Some("CREATOR_REQUIRED"),
                message: None,
            },
            PasskeepError::Unauthorized => ApiErrorBody {
                code: status.as_u16(),
                i18n: Some("UNAUTHORIZED"),
                message: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Error body; shares `code`/`i18n` with the regular result envelope.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
