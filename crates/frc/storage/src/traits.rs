use crate::model::{CoherenceLog, CoherenceStats, ProtocolSession, ProtocolTemplate, User};
use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use frc_types::{LogId, ProtocolSlug, SessionId, UserId};

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    /// Window with a limit and no offset.
    pub fn limited(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }
}

/// Storage for registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with a conflict when the id or username is
    /// already taken.
    async fn create_user(&self, user: User) -> StorageResult<()>;

    /// Get a user by id.
    async fn get_user(&self, id: &UserId) -> StorageResult<Option<User>>;

    /// Get a user by username.
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    /// List all users.
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// Update an existing user. Fails with not-found when missing.
    async fn update_user(&self, user: User) -> StorageResult<()>;

    /// Delete a user by id.
    async fn delete_user(&self, id: &UserId) -> StorageResult<bool>;
}

/// Storage for protocol templates.
#[async_trait]
pub trait ProtocolStore: Send + Sync {
    /// Create or update a protocol template.
    async fn upsert_protocol(&self, protocol: ProtocolTemplate) -> StorageResult<()>;

    /// Get a template by slug.
    async fn get_protocol(&self, slug: &ProtocolSlug) -> StorageResult<Option<ProtocolTemplate>>;

    /// List templates, optionally only active ones.
    async fn list_protocols(&self, only_active: bool) -> StorageResult<Vec<ProtocolTemplate>>;

    /// Delete a template by slug.
    async fn delete_protocol(&self, slug: &ProtocolSlug) -> StorageResult<bool>;
}

/// Storage for protocol sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a newly started session.
    async fn create_session(&self, session: ProtocolSession) -> StorageResult<()>;

    /// Get a session by id.
    async fn get_session(&self, id: &SessionId) -> StorageResult<Option<ProtocolSession>>;

    /// List sessions newest-first.
    async fn list_recent_sessions(&self, window: QueryWindow)
        -> StorageResult<Vec<ProtocolSession>>;

    /// List sessions for one user, newest-first.
    async fn list_sessions_for_user(&self, user_id: &UserId)
        -> StorageResult<Vec<ProtocolSession>>;

    /// Mark a session completed. Fails with not-found when missing and with
    /// an invariant violation when the session already completed.
    async fn complete_session(
        &self,
        id: &SessionId,
        completed_at: DateTime<Utc>,
        coherence_improvement: Option<f64>,
    ) -> StorageResult<ProtocolSession>;
}

/// Storage for coherence logs.
#[async_trait]
pub trait CoherenceLogStore: Send + Sync {
    /// Append one scoring record.
    async fn append_log(&self, log: CoherenceLog) -> StorageResult<()>;

    /// Get a log entry by id.
    async fn get_log(&self, id: &LogId) -> StorageResult<Option<CoherenceLog>>;

    /// List log entries newest-first.
    async fn list_recent_logs(&self, window: QueryWindow) -> StorageResult<Vec<CoherenceLog>>;

    /// List log entries for one user, newest-first.
    async fn list_logs_for_user(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<CoherenceLog>>;

    /// Count and mean S_FRC over all logs.
    async fn coherence_stats(&self) -> StorageResult<CoherenceStats>;
}

/// Unified storage bundle used by the service layer.
pub trait FrcStorage:
    UserStore + ProtocolStore + SessionStore + CoherenceLogStore + Send + Sync
{
}

impl<T> FrcStorage for T where
    T: UserStore + ProtocolStore + SessionStore + CoherenceLogStore + Send + Sync
{
}
