use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::StoreError;
use crate::storage::MediaError;

/// Everything that can go wrong while serving an upload or listing request
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid multipart form: {0}")]
    InvalidForm(String),

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Field '{0}' accepts a single file")]
    DuplicateField(String),

    #[error(transparent)]
    Upload(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidForm(_)
            | ServiceError::UnexpectedField(_)
            | ServiceError::DuplicateField(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upload(_) | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}

/// A `ServiceError` paired with the route-level message shown to clients
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    source: ServiceError,
}

impl ApiError {
    pub fn new(message: &'static str, source: impl Into<ServiceError>) -> Self {
        Self {
            message,
            source: source.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.source.status_code();
        if status.is_server_error() {
            tracing::error!("{}: {}", self.message, self.source);
        } else {
            tracing::warn!("{}: {}", self.message, self.source);
        }

        let body = ErrorResponse {
            message: self.message.to_string(),
            error: self.source.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
