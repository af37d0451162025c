//! Platform information and liveness handlers

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Platform information response
#[derive(Debug, Serialize)]
pub struct PlatformInfoResponse {
    pub platform: String,
    pub version: String,
    pub description: String,
    pub status: String,
    pub admin_stats_url: String,
    pub features: PlatformFeatures,
}

/// Feature summary shown at the root endpoint
#[derive(Debug, Serialize)]
pub struct PlatformFeatures {
    pub coherence_tracking: String,
    pub protocols: String,
    pub database: String,
}

/// Root endpoint with platform information
pub async fn platform_info(State(state): State<AppState>) -> Json<PlatformInfoResponse> {
    Json(PlatformInfoResponse {
        platform: "FRC Platform".to_string(),
        version: state.version.clone(),
        description: "Coherence scoring and tracking backend".to_string(),
        status: "operational".to_string(),
        admin_stats_url: "/admin/api/stats".to_string(),
        features: PlatformFeatures {
            coherence_tracking: "S_FRC calculations and logging".to_string(),
            protocols: "Interactive protocol templates and sessions".to_string(),
            database: "PostgreSQL or in-memory".to_string(),
        },
    })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}
