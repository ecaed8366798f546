//! Registration and password reset. These routes are not behind auth.

use api_types::{
    ApiResult,
    user::{PasswordResetConfirm, PasswordResetRequest, UserCreated, UserRegister},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::RegisterUserCmd;

use crate::{ServerError, respond, server::ServerState};

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<UserRegister>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResult<UserCreated>>), ServerError> {
    let Json(payload) = payload?;
    let cmd = RegisterUserCmd::new(payload.username, payload.email, payload.password);
    let outcome = state.engine.register(cmd).await;
    let body = respond(outcome, |id| UserCreated { id })?;
    Ok((StatusCode::CREATED, body))
}

pub async fn request_reset(
    State(state): State<ServerState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Result<Json<ApiResult<()>>, ServerError> {
    let Json(payload) = payload?;
    let outcome = state
        .engine
        .request_password_reset(&payload.email, state.mailer.as_ref())
        .await;
    respond(outcome, |()| ())
}

pub async fn confirm_reset(
    State(state): State<ServerState>,
    payload: Result<Json<PasswordResetConfirm>, JsonRejection>,
) -> Result<Json<ApiResult<()>>, ServerError> {
    let Json(payload) = payload?;
    let outcome = state
        .engine
        .reset_password(&payload.token, &payload.new_password)
        .await;
    respond(outcome, |()| ())
}
