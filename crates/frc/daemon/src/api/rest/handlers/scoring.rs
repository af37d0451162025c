//! S_FRC calculation handler

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use frc_core::Scorer;
use frc_storage::CoherenceLog;
use frc_types::{CoherenceScore, InterpretationBand, LogId, MuLevels, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// S_FRC calculation request
#[derive(Debug, Deserialize)]
pub struct CalculateSfrcRequest {
    /// The eight μ-levels, μ0 first
    pub coherence_levels: Vec<f64>,

    /// When present, the result is logged against this user
    #[serde(default)]
    pub user_id: Option<Uuid>,

    /// Free-text context stored with the log entry
    #[serde(default)]
    pub context: Option<String>,
}

/// S_FRC calculation response
#[derive(Debug, Serialize)]
pub struct CalculateSfrcResponse {
    /// Score rounded to six decimals
    pub sfrc: f64,
    /// Echo of the input vector
    pub coherence_levels: Vec<f64>,
    /// Band name: Low / Moderate / Good / High
    pub band: String,
    /// Human-readable interpretation of the band
    pub interpretation: String,
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

/// Calculate S_FRC and optionally log the result
pub async fn calculate_sfrc(
    State(state): State<AppState>,
    Json(request): Json<CalculateSfrcRequest>,
) -> ApiResult<Json<CalculateSfrcResponse>> {
    let levels = MuLevels::from_slice(&request.coherence_levels)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let score = Scorer::new().score(&levels);
    let band = score.band();
    let context = request
        .context
        .unwrap_or_else(|| "api_calculation".to_string());

    // Persistence is fire-and-forget: the computed score is returned even
    // when the log cannot be written.
    if let Some(user_id) = request.user_id {
        log_calculation(
            &state,
            UserId::from_uuid(user_id),
            levels,
            score,
            band,
            &context,
        )
        .await;
    }

    Ok(Json(CalculateSfrcResponse {
        sfrc: score.rounded(),
        coherence_levels: request.coherence_levels,
        band: band.as_str().to_string(),
        interpretation: band.description().to_string(),
        context,
        timestamp: Utc::now(),
    }))
}

async fn log_calculation(
    state: &AppState,
    user_id: UserId,
    levels: MuLevels,
    score: CoherenceScore,
    band: InterpretationBand,
    context: &str,
) {
    match state.storage.get_user(&user_id).await {
        Ok(Some(_)) => {
            let log = CoherenceLog {
                id: LogId::generate(),
                user_id: Some(user_id.clone()),
                mu_levels: levels,
                sfrc_score: score,
                context: context.to_string(),
                calculation_method: "api_standard".to_string(),
                notes: Some(band.description().to_string()),
                created_at: Utc::now(),
            };
            if let Err(e) = state.storage.append_log(log).await {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to persist coherence log");
            }
        }
        Ok(None) => {
            tracing::warn!(user_id = %user_id, "Coherence log skipped: unknown user");
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to look up user for coherence log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::handlers::test_support::test_state;
    use frc_storage::{QueryWindow, User};

    const SAMPLE: [f64; 8] = [0.1, 0.3, 0.5, 0.8, 0.9, 0.7, 0.4, 0.2];

    fn request(levels: &[f64], user_id: Option<Uuid>) -> CalculateSfrcRequest {
        CalculateSfrcRequest {
            coherence_levels: levels.to_vec(),
            user_id,
            context: Some("admin_test_comprehensive".to_string()),
        }
    }

    #[tokio::test]
    async fn test_calculate_sfrc_round_trip() {
        let state = test_state();
        let Json(response) = calculate_sfrc(State(state), Json(request(&SAMPLE, None)))
            .await
            .unwrap();

        assert!((response.sfrc - 0.378_248).abs() < 1e-6);
        assert_eq!(response.band, "Moderate");
        assert_eq!(response.coherence_levels, SAMPLE.to_vec());
        assert_eq!(response.context, "admin_test_comprehensive");
    }

    #[tokio::test]
    async fn test_wrong_length_is_validation_error() {
        let state = test_state();
        let err = calculate_sfrc(State(state), Json(request(&[0.5; 7], None)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_known_user_gets_a_log_entry() {
        let state = test_state();
        let user = User::new("hadi", "hadi@example.com");
        let user_uuid = *user.id.as_uuid();
        state.storage.create_user(user).await.unwrap();

        calculate_sfrc(State(state.clone()), Json(request(&SAMPLE, Some(user_uuid))))
            .await
            .unwrap();

        let logs = state
            .storage
            .list_recent_logs(QueryWindow::default())
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert!((logs[0].sfrc_score.value() - 0.378_248).abs() < 1e-6);
        assert_eq!(logs[0].context, "admin_test_comprehensive");
    }

    #[tokio::test]
    async fn test_unknown_user_still_gets_a_score() {
        let state = test_state();

        let Json(response) = calculate_sfrc(
            State(state.clone()),
            Json(request(&SAMPLE, Some(Uuid::new_v4()))),
        )
        .await
        .unwrap();

        // scoring succeeded even though nothing could be logged
        assert_eq!(response.band, "Moderate");
        let logs = state
            .storage
            .list_recent_logs(QueryWindow::default())
            .await
            .unwrap();
        assert!(logs.is_empty());
    }
}
