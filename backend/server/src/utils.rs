use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::{error::AppError, user::PublicUser};

#[derive(Deserialize)]
pub struct SignupPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub symptom: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Unwraps an extracted body, turning any rejection into [`AppError::MalformedPayload`].
pub fn get_payload<T: DeserializeOwned>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!("Rejected payload: {e}");
        AppError::MalformedPayload
    })
}

pub fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
