//! Protocol template handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use frc_storage::ProtocolTemplate;
use frc_types::ProtocolSlug;
use serde::{Deserialize, Serialize};

/// Create/update protocol request
#[derive(Debug, Deserialize)]
pub struct CreateProtocolRequest {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub difficulty_level: String,
    pub category: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Create protocol response
#[derive(Debug, Serialize)]
pub struct CreateProtocolResponse {
    pub id: String,
    pub created: bool,
}

/// Protocol summary as reported in listings
#[derive(Debug, Serialize)]
pub struct ProtocolInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration: String,
    pub difficulty: String,
    pub category: String,
    pub steps_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<ProtocolTemplate> for ProtocolInfo {
    fn from(protocol: ProtocolTemplate) -> Self {
        Self {
            id: protocol.slug.as_str().to_string(),
            name: protocol.name,
            description: protocol.description,
            duration: format!("{} minutes", protocol.duration_minutes),
            difficulty: protocol.difficulty_level,
            category: protocol.category,
            steps_count: protocol.steps.len(),
            created_at: protocol.created_at,
        }
    }
}

/// Protocol list response
#[derive(Debug, Serialize)]
pub struct ProtocolListResponse {
    pub protocols: Vec<ProtocolInfo>,
    pub total_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// List active protocols
pub async fn list_protocols(
    State(state): State<AppState>,
) -> ApiResult<Json<ProtocolListResponse>> {
    let protocols = state.storage.list_protocols(true).await?;
    let protocols: Vec<ProtocolInfo> = protocols.into_iter().map(ProtocolInfo::from).collect();

    Ok(Json(ProtocolListResponse {
        total_count: protocols.len(),
        protocols,
        timestamp: Utc::now(),
    }))
}

/// Create or update a protocol template
pub async fn create_protocol(
    State(state): State<AppState>,
    Json(request): Json<CreateProtocolRequest>,
) -> ApiResult<Json<CreateProtocolResponse>> {
    if request.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug must not be empty".to_string()));
    }

    let protocol = ProtocolTemplate {
        slug: ProtocolSlug::new(request.slug.clone()),
        name: request.name,
        description: request.description,
        duration_minutes: request.duration_minutes,
        difficulty_level: request.difficulty_level,
        category: request.category,
        steps: request.steps,
        is_active: request.is_active,
        created_at: Utc::now(),
    };

    state.storage.upsert_protocol(protocol).await?;

    tracing::info!(slug = %request.slug, "Stored protocol template");

    Ok(Json(CreateProtocolResponse {
        id: request.slug,
        created: true,
    }))
}

/// Get a specific protocol template
pub async fn get_protocol(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ProtocolTemplate>> {
    let slug = ProtocolSlug::new(slug);
    let protocol = state
        .storage
        .get_protocol(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Protocol {} not found", slug)))?;

    Ok(Json(protocol))
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Delete a protocol template
pub async fn delete_protocol(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let slug = ProtocolSlug::new(slug);
    let deleted = state.storage.delete_protocol(&slug).await?;

    if deleted {
        tracing::info!(slug = %slug, "Deleted protocol template");
    }

    Ok(Json(DeleteResponse { deleted }))
}
