use chrono::{DateTime, Utc};
use frc_types::{CoherenceScore, LogId, MuLevels, ProtocolSlug, SessionId, UserId};
use serde::{Deserialize, Serialize};

/// Registered platform user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    /// S_FRC measured at registration, the reference point for improvement.
    pub baseline_sfrc: f64,
    /// Free-form label for the user's current coherence development stage.
    pub coherence_level: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New active, non-admin user with a zero baseline.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            full_name: String::new(),
            is_active: true,
            is_admin: false,
            baseline_sfrc: 0.0,
            coherence_level: "novice".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Template describing an interactive protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolTemplate {
    pub slug: ProtocolSlug,
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub difficulty_level: String,
    pub category: String,
    /// Ordered step descriptions shown to participants.
    pub steps: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One run of a protocol by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub protocol_slug: ProtocolSlug,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    /// S_FRC delta observed over the session, when measured.
    pub coherence_improvement: Option<f64>,
    pub duration_minutes: u32,
}

impl ProtocolSession {
    /// Start a new session now.
    pub fn start(user_id: UserId, protocol_slug: ProtocolSlug, duration_minutes: u32) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            protocol_slug,
            started_at: Utc::now(),
            completed_at: None,
            is_completed: false,
            coherence_improvement: None,
            duration_minutes,
        }
    }
}

/// Persisted record of one S_FRC calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceLog {
    pub id: LogId,
    /// Absent for anonymous calculations.
    pub user_id: Option<UserId>,
    pub mu_levels: MuLevels,
    pub sfrc_score: CoherenceScore,
    pub context: String,
    pub calculation_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate view over all coherence logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoherenceStats {
    pub total_logs: u64,
    /// Mean S_FRC over all logs; 0.0 when no logs exist.
    pub average_sfrc: f64,
}
