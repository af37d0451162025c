//! Session-token handlers
//!
//! Tokens are bookkeeping for the admin surface, not an authentication
//! scheme: login checks that the user exists and is active, then hands out
//! an opaque token that expires on its own or on logout.

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue a session token for an active user
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .storage
        .get_user_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(format!("unknown user {}", request.username)))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized(format!(
            "user {} is inactive",
            request.username
        )));
    }

    let issued = state.tokens.issue(&user.username);

    tracing::info!(username = %issued.username, "Issued session token");

    Ok(Json(LoginResponse {
        token: issued.token,
        username: issued.username,
        expires_at: issued.expires_at,
    }))
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

/// Revoke a session token
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> ApiResult<Json<LogoutResponse>> {
    let revoked = state.tokens.revoke(&request.token);
    Ok(Json(LogoutResponse { revoked }))
}

/// Verify query parameters
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub token: String,
}

/// Verify response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub username: Option<String>,
}

/// Check whether a session token is live
pub async fn verify_token(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Json<VerifyResponse> {
    let username = state.tokens.username(&params.token);
    Json(VerifyResponse {
        valid: username.is_some(),
        username,
    })
}
