use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::error;

use crate::{database::StoreError, gemini::GeneratorError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("AI service unavailable")]
    UpstreamUnavailable(#[from] GeneratorError),

    #[error("Server error")]
    Storage(#[from] StoreError),

    #[error("Server error")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload
            | AppError::InvalidInput(_)
            | AppError::DuplicateEmail
            | AppError::UserNotFound
            | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_)
            | AppError::Storage(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body key the browser scripts read for this kind of failure.
    fn body_key(&self) -> &'static str {
        match self {
            AppError::MalformedPayload
            | AppError::InvalidInput(_)
            | AppError::UpstreamUnavailable(_) => "error",
            _ => "message",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::UpstreamUnavailable(e) => error!("Gemini API error: {e}"),
            AppError::Storage(e) => error!("Store error: {e}"),
            AppError::InternalError(e) => error!("Internal error: {e}"),
            _ => {}
        }

        let status = self.status();
        let mut body = Map::new();
        body.insert(self.body_key().to_string(), Value::String(self.to_string()));

        (status, Json(Value::Object(body))).into_response()
    }
}
