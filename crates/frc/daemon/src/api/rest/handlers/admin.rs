//! Admin statistics handler

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use frc_storage::QueryWindow;
use serde::Serialize;

/// Admin statistics response
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub users: usize,
    pub sessions: usize,
    pub protocols: usize,
    pub total_coherence_logs: u64,
    pub avg_sfrc: f64,
    pub timestamp: DateTime<Utc>,
}

/// Get admin statistics
pub async fn admin_stats(State(state): State<AppState>) -> ApiResult<Json<AdminStatsResponse>> {
    let users = state.storage.list_users().await?;
    let sessions = state
        .storage
        .list_recent_sessions(QueryWindow::default())
        .await?;
    let protocols = state.storage.list_protocols(true).await?;
    let stats = state.storage.coherence_stats().await?;

    Ok(Json(AdminStatsResponse {
        users: users.len(),
        sessions: sessions.len(),
        protocols: protocols.len(),
        total_coherence_logs: stats.total_logs,
        avg_sfrc: stats.average_sfrc,
        timestamp: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::handlers::test_support::test_state;
    use frc_storage::{CoherenceLog, User};
    use frc_types::{CoherenceScore, LogId, MuLevels};

    #[tokio::test]
    async fn test_admin_stats_aggregation() {
        let state = test_state();
        state
            .storage
            .create_user(User::new("hadi", "hadi@example.com"))
            .await
            .unwrap();

        for score in [0.3, 0.7] {
            state
                .storage
                .append_log(CoherenceLog {
                    id: LogId::generate(),
                    user_id: None,
                    mu_levels: MuLevels::new([score; 8]),
                    sfrc_score: CoherenceScore::new(score),
                    context: "test".to_string(),
                    calculation_method: "api_standard".to_string(),
                    notes: None,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let Json(stats) = admin_stats(State(state)).await.unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.sessions, 0);
        assert_eq!(stats.total_coherence_logs, 2);
        assert!((stats.avg_sfrc - 0.5).abs() < 1e-12);
    }
}
