//! `/auth` handlers.
//!
//! Flows that write tokens or counters run on a detached task.

use crate::api::run_detached;
use crate::{
    ApiResult, AppState, AuthUser, ClientOrigin, EmailRequest, IdentityDto, LoginRequest,
    MessageResponse, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenResponse,
    VerifyEmailQuery,
};

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};

pub const PASSWORD_RESET_ACK: &str = "If the email is registered, a reset link has been sent";
pub const VERIFICATION_ACK: &str =
    "If the email is registered and unverified, a verification link has been sent";

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    origin: ClientOrigin,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdentityDto>)> {
    let Json(body) = payload?;

    let identity = run_detached(async move {
        state
            .services
            .accounts
            .register(&body.email, &body.password, &origin.ip)
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    origin: ClientOrigin,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(body) = payload?;

    let response = run_detached(async move {
        let tokens = state
            .services
            .sessions
            .login(&body.email, &body.password, &origin.fingerprint())
            .await
            .map_err(|e| state.api_error(e))?;
        Ok(TokenResponse::new(tokens, state.services.issuer.lifetimes().access))
    })
    .await?;

    Ok(Json(response))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    origin: ClientOrigin,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(body) = payload?;

    let response = run_detached(async move {
        let tokens = state
            .services
            .sessions
            .refresh(&body.refresh_token, &origin.fingerprint())
            .await
            .map_err(|e| state.api_error(e))?;
        Ok(TokenResponse::new(tokens, state.services.issuer.lifetimes().access))
    })
    .await?;

    Ok(Json(response))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    origin: ClientOrigin,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload?;

    run_detached(async move {
        state
            .services
            .sessions
            .logout(&body.refresh_token, &origin.fingerprint())
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok(Json(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn me(AuthUser(identity): AuthUser) -> Json<IdentityDto> {
    Json(identity.into())
}

/// POST /auth/request-password-reset
///
/// Same answer whether or not the email is registered.
pub async fn request_password_reset(
    State(state): State<AppState>,
    origin: ClientOrigin,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload?;

    run_detached(async move {
        state
            .services
            .accounts
            .request_password_reset(&body.email, &origin.ip)
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok(Json(MessageResponse::new(PASSWORD_RESET_ACK)))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    origin: ClientOrigin,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload?;

    run_detached(async move {
        state
            .services
            .accounts
            .reset_password(&body.token, &body.new_password, &origin.ip)
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// POST /auth/send-verification-email
pub async fn send_verification_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload?;

    state
        .services
        .accounts
        .send_verification(&body.email)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(MessageResponse::new(VERIFICATION_ACK)))
}

/// GET /auth/verify-email?token=
pub async fn verify_email(
    State(state): State<AppState>,
    origin: ClientOrigin,
    query: Result<Query<VerifyEmailQuery>, QueryRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Query(query) = query?;

    run_detached(async move {
        state
            .services
            .accounts
            .verify_email(&query.token, &origin.ip)
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok(Json(MessageResponse::new("Email verified successfully")))
}
