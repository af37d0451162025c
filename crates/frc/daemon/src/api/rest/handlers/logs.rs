//! Coherence log handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use frc_storage::{CoherenceLog, QueryWindow};
use serde::Serialize;
use uuid::Uuid;

/// Most recent log entries reported by the listing endpoint.
const RECENT_LOG_LIMIT: usize = 100;

/// Coherence log entry as reported by the API
#[derive(Debug, Serialize)]
pub struct LogInfo {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub sfrc_score: f64,
    pub mu_levels: Vec<f64>,
    pub context: String,
    pub created_at: DateTime<Utc>,
}

impl From<CoherenceLog> for LogInfo {
    fn from(log: CoherenceLog) -> Self {
        Self {
            id: *log.id.as_uuid(),
            user_id: log.user_id.map(|id| *id.as_uuid()),
            sfrc_score: log.sfrc_score.rounded(),
            mu_levels: log.mu_levels.into(),
            context: log.context,
            created_at: log.created_at,
        }
    }
}

/// Coherence log list response
#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub logs: Vec<LogInfo>,
    pub total_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// List recent coherence calculations
pub async fn list_coherence_logs(
    State(state): State<AppState>,
) -> ApiResult<Json<LogListResponse>> {
    let logs = state
        .storage
        .list_recent_logs(QueryWindow::limited(RECENT_LOG_LIMIT))
        .await?;
    let logs: Vec<LogInfo> = logs.into_iter().map(LogInfo::from).collect();

    Ok(Json(LogListResponse {
        total_count: logs.len(),
        logs,
        timestamp: Utc::now(),
    }))
}
