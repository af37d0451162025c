//! Protocol session handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use frc_storage::{ProtocolSession, QueryWindow};
use frc_types::{ProtocolSlug, SessionId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most recent sessions reported by the listing endpoint.
const RECENT_SESSION_LIMIT: usize = 50;

/// Start session request
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: Uuid,
    pub protocol_slug: String,
}

/// Session info as reported by the API
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub protocol: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub coherence_improvement: Option<f64>,
    pub duration_minutes: u32,
}

impl From<ProtocolSession> for SessionInfo {
    fn from(session: ProtocolSession) -> Self {
        Self {
            id: *session.id.as_uuid(),
            user_id: *session.user_id.as_uuid(),
            protocol: session.protocol_slug.as_str().to_string(),
            started_at: session.started_at,
            completed_at: session.completed_at,
            is_completed: session.is_completed,
            coherence_improvement: session.coherence_improvement,
            duration_minutes: session.duration_minutes,
        }
    }
}

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
    pub total_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// List recent sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<SessionListResponse>> {
    let sessions = state
        .storage
        .list_recent_sessions(QueryWindow::limited(RECENT_SESSION_LIMIT))
        .await?;
    let sessions: Vec<SessionInfo> = sessions.into_iter().map(SessionInfo::from).collect();

    Ok(Json(SessionListResponse {
        total_count: sessions.len(),
        sessions,
        timestamp: Utc::now(),
    }))
}

/// Start a new protocol session
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> ApiResult<Json<SessionInfo>> {
    let user_id = UserId::from_uuid(request.user_id);
    if state.storage.get_user(&user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "User {} not found",
            request.user_id
        )));
    }

    let slug = ProtocolSlug::new(request.protocol_slug);
    let protocol = state
        .storage
        .get_protocol(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Protocol {} not found", slug)))?;

    if !protocol.is_active {
        return Err(ApiError::BadRequest(format!(
            "Protocol {} is not active",
            slug
        )));
    }

    let session = ProtocolSession::start(user_id, slug, protocol.duration_minutes);
    state.storage.create_session(session.clone()).await?;

    tracing::info!(session_id = %session.id, "Started protocol session");

    Ok(Json(session.into()))
}

/// Get a specific session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionInfo>> {
    let session_id = SessionId::from_uuid(id);
    let session = state
        .storage
        .get_session(&session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", id)))?;

    Ok(Json(session.into()))
}

/// Complete session request
#[derive(Debug, Default, Deserialize)]
pub struct CompleteSessionRequest {
    #[serde(default)]
    pub coherence_improvement: Option<f64>,
}

/// Mark a session completed
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteSessionRequest>,
) -> ApiResult<Json<SessionInfo>> {
    let session_id = SessionId::from_uuid(id);
    let session = state
        .storage
        .complete_session(&session_id, Utc::now(), request.coherence_improvement)
        .await?;

    tracing::info!(session_id = %session.id, "Completed protocol session");

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::handlers::test_support::test_state;
    use chrono::Utc;
    use frc_storage::{ProtocolTemplate, StorageError, User};

    async fn seed(state: &AppState, active: bool) -> Uuid {
        let user = User::new("hadi", "hadi@example.com");
        let user_uuid = *user.id.as_uuid();
        state.storage.create_user(user).await.unwrap();
        state
            .storage
            .upsert_protocol(ProtocolTemplate {
                slug: ProtocolSlug::new("breath-ladder"),
                name: "Breath Ladder".to_string(),
                description: "Guided breathing across levels".to_string(),
                duration_minutes: 15,
                difficulty_level: "beginner".to_string(),
                category: "breathing".to_string(),
                steps: vec!["settle".to_string()],
                is_active: active,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        user_uuid
    }

    #[tokio::test]
    async fn test_start_and_complete_session() {
        let state = test_state();
        let user_uuid = seed(&state, true).await;

        let Json(started) = start_session(
            State(state.clone()),
            Json(StartSessionRequest {
                user_id: user_uuid,
                protocol_slug: "breath-ladder".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(!started.is_completed);
        assert_eq!(started.duration_minutes, 15);

        let Json(completed) = complete_session(
            State(state),
            Path(started.id),
            Json(CompleteSessionRequest {
                coherence_improvement: Some(0.08),
            }),
        )
        .await
        .unwrap();
        assert!(completed.is_completed);
        assert_eq!(completed.coherence_improvement, Some(0.08));
    }

    #[tokio::test]
    async fn test_start_requires_known_user_and_protocol() {
        let state = test_state();

        let err = start_session(
            State(state.clone()),
            Json(StartSessionRequest {
                user_id: Uuid::new_v4(),
                protocol_slug: "breath-ladder".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let user_uuid = seed(&state, true).await;
        let err = start_session(
            State(state),
            Json(StartSessionRequest {
                user_id: user_uuid,
                protocol_slug: "ghost".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_inactive_protocol_rejected() {
        let state = test_state();
        let user_uuid = seed(&state, false).await;

        let err = start_session(
            State(state),
            Json(StartSessionRequest {
                user_id: user_uuid,
                protocol_slug: "breath-ladder".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_double_complete_conflicts() {
        let state = test_state();
        let user_uuid = seed(&state, true).await;

        let Json(started) = start_session(
            State(state.clone()),
            Json(StartSessionRequest {
                user_id: user_uuid,
                protocol_slug: "breath-ladder".to_string(),
            }),
        )
        .await
        .unwrap();

        complete_session(
            State(state.clone()),
            Path(started.id),
            Json(CompleteSessionRequest::default()),
        )
        .await
        .unwrap();

        let err = complete_session(
            State(state),
            Path(started.id),
            Json(CompleteSessionRequest::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Storage(StorageError::InvariantViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first() {
        let state = test_state();
        let user_uuid = seed(&state, true).await;

        for _ in 0..3 {
            start_session(
                State(state.clone()),
                Json(StartSessionRequest {
                    user_id: user_uuid,
                    protocol_slug: "breath-ladder".to_string(),
                }),
            )
            .await
            .unwrap();
        }

        let Json(listed) = list_sessions(State(state)).await.unwrap();
        assert_eq!(listed.total_count, 3);
        assert!(listed.sessions[0].started_at >= listed.sessions[2].started_at);
    }
}
