use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    chat::analyze,
    error::AppError,
    state::AppState,
    utils::{
        ChatPayload, ChatResponse, LoginPayload, LoginResponse, MessageResponse, SignupPayload,
        field, get_payload,
    },
};

pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = get_payload(payload)?;

    state
        .auth
        .signup(
            field(&payload.name),
            field(&payload.email),
            field(&payload.password),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = get_payload(payload)?;

    let session = state
        .auth
        .login(field(&payload.email), field(&payload.password))
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: session.token,
        user: session.user,
    }))
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = get_payload(payload)?;

    let response = analyze(
        state.generator.as_ref(),
        &state.directory,
        field(&payload.symptom),
    )
    .await?;

    Ok(Json(ChatResponse { response }))
}
