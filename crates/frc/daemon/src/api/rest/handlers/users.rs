//! User management handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use frc_storage::User;
use frc_types::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub baseline_sfrc: Option<f64>,
}

/// Create user response
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub created: bool,
}

/// User info as reported by the API
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub baseline_sfrc: f64,
    pub coherence_level: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_admin: user.is_admin,
            baseline_sfrc: user.baseline_sfrc,
            coherence_level: user.coherence_level,
            created_at: user.created_at,
        }
    }
}

/// User list response
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserInfo>,
    pub total_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users = state.storage.list_users().await?;
    let users: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();

    Ok(Json(UserListResponse {
        total_count: users.len(),
        users,
        timestamp: Utc::now(),
    }))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<Json<CreateUserResponse>> {
    if request.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".to_string()));
    }

    let mut user = User::new(request.username, request.email);
    if let Some(full_name) = request.full_name {
        user.full_name = full_name;
    }
    user.is_admin = request.is_admin;
    if let Some(baseline) = request.baseline_sfrc {
        user.baseline_sfrc = baseline;
    }

    let id = *user.id.as_uuid();
    state.storage.create_user(user).await?;

    tracing::info!(user_id = %id, "Created user");

    Ok(Json(CreateUserResponse { id, created: true }))
}

/// Get a specific user
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserInfo>> {
    let user_id = UserId::from_uuid(id);
    let user = state
        .storage
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;

    Ok(Json(user.into()))
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let user_id = UserId::from_uuid(id);
    let deleted = state.storage.delete_user(&user_id).await?;

    if deleted {
        tracing::info!(user_id = %id, "Deleted user");
    }

    Ok(Json(DeleteResponse { deleted }))
}
