//! In-memory storage implementation

use crate::error::{StorageError, StorageResult};
use crate::model::{CoherenceLog, CoherenceStats, ProtocolSession, ProtocolTemplate, User};
use crate::traits::{
    CoherenceLogStore, ProtocolStore, QueryWindow, SessionStore, UserStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use frc_types::{LogId, ProtocolSlug, SessionId, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory storage for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    users: RwLock<HashMap<UserId, User>>,
    protocols: RwLock<HashMap<ProtocolSlug, ProtocolTemplate>>,
    sessions: RwLock<HashMap<SessionId, ProtocolSession>>,
    logs: RwLock<Vec<CoherenceLog>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_window<T>(mut items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let offset = window.offset.min(items.len());
    items.drain(..offset);
    if window.limit > 0 {
        items.truncate(window.limit);
    }
    items
}

#[async_trait]
impl UserStore for InMemoryStorage {
    async fn create_user(&self, user: User) -> StorageResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StorageError::Conflict(format!(
                "user {} already exists",
                user.id
            )));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StorageError::Conflict(format!(
                "username {} already taken",
                user.username
            )));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> StorageResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<_> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn update_user(&self, user: User) -> StorageResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StorageError::NotFound(format!("user {} not found", user.id)));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> StorageResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(id).is_some())
    }
}

#[async_trait]
impl ProtocolStore for InMemoryStorage {
    async fn upsert_protocol(&self, protocol: ProtocolTemplate) -> StorageResult<()> {
        let mut protocols = self.protocols.write().await;
        protocols.insert(protocol.slug.clone(), protocol);
        Ok(())
    }

    async fn get_protocol(&self, slug: &ProtocolSlug) -> StorageResult<Option<ProtocolTemplate>> {
        let protocols = self.protocols.read().await;
        Ok(protocols.get(slug).cloned())
    }

    async fn list_protocols(&self, only_active: bool) -> StorageResult<Vec<ProtocolTemplate>> {
        let protocols = self.protocols.read().await;
        let mut all: Vec<_> = protocols
            .values()
            .filter(|p| !only_active || p.is_active)
            .cloned()
            .collect();
        all.sort_by(|a, b| a.slug.as_str().cmp(b.slug.as_str()));
        Ok(all)
    }

    async fn delete_protocol(&self, slug: &ProtocolSlug) -> StorageResult<bool> {
        let mut protocols = self.protocols.write().await;
        Ok(protocols.remove(slug).is_some())
    }
}

#[async_trait]
impl SessionStore for InMemoryStorage {
    async fn create_session(&self, session: ProtocolSession) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(StorageError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> StorageResult<Option<ProtocolSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn list_recent_sessions(
        &self,
        window: QueryWindow,
    ) -> StorageResult<Vec<ProtocolSession>> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<_> = sessions.values().cloned().collect();
        all.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(apply_window(all, window))
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Vec<ProtocolSession>> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<_> = sessions
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(all)
    }

    async fn complete_session(
        &self,
        id: &SessionId,
        completed_at: DateTime<Utc>,
        coherence_improvement: Option<f64>,
    ) -> StorageResult<ProtocolSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("session {} not found", id)))?;

        if session.is_completed {
            return Err(StorageError::InvariantViolation(format!(
                "session {} already completed",
                id
            )));
        }

        session.is_completed = true;
        session.completed_at = Some(completed_at);
        session.coherence_improvement = coherence_improvement;
        Ok(session.clone())
    }
}

#[async_trait]
impl CoherenceLogStore for InMemoryStorage {
    async fn append_log(&self, log: CoherenceLog) -> StorageResult<()> {
        let mut logs = self.logs.write().await;
        logs.push(log);
        Ok(())
    }

    async fn get_log(&self, id: &LogId) -> StorageResult<Option<CoherenceLog>> {
        let logs = self.logs.read().await;
        Ok(logs.iter().find(|l| &l.id == id).cloned())
    }

    async fn list_recent_logs(&self, window: QueryWindow) -> StorageResult<Vec<CoherenceLog>> {
        let logs = self.logs.read().await;
        let mut all: Vec<_> = logs.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apply_window(all, window))
    }

    async fn list_logs_for_user(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<CoherenceLog>> {
        let logs = self.logs.read().await;
        let mut all: Vec<_> = logs
            .iter()
            .filter(|l| l.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apply_window(all, window))
    }

    async fn coherence_stats(&self) -> StorageResult<CoherenceStats> {
        let logs = self.logs.read().await;
        if logs.is_empty() {
            return Ok(CoherenceStats {
                total_logs: 0,
                average_sfrc: 0.0,
            });
        }
        let sum: f64 = logs.iter().map(|l| l.sfrc_score.value()).sum();
        Ok(CoherenceStats {
            total_logs: logs.len() as u64,
            average_sfrc: sum / logs.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use frc_types::{CoherenceScore, MuLevels};

    fn sample_log(user_id: Option<UserId>, score: f64, age_secs: i64) -> CoherenceLog {
        CoherenceLog {
            id: LogId::generate(),
            user_id,
            mu_levels: MuLevels::new([0.5; 8]),
            sfrc_score: CoherenceScore::new(score),
            context: "test".to_string(),
            calculation_method: "api_standard".to_string(),
            notes: None,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let storage = InMemoryStorage::new();
        let user = User::new("hadi", "hadi@example.com");
        let id = user.id.clone();

        storage.create_user(user.clone()).await.unwrap();
        assert!(storage.get_user(&id).await.unwrap().is_some());
        assert!(storage
            .get_user_by_username("hadi")
            .await
            .unwrap()
            .is_some());

        let mut updated = user.clone();
        updated.coherence_level = "adept".to_string();
        storage.update_user(updated).await.unwrap();
        assert_eq!(
            storage.get_user(&id).await.unwrap().unwrap().coherence_level,
            "adept"
        );

        assert!(storage.delete_user(&id).await.unwrap());
        assert!(!storage.delete_user(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let storage = InMemoryStorage::new();
        storage
            .create_user(User::new("hadi", "hadi@example.com"))
            .await
            .unwrap();

        let err = storage
            .create_user(User::new("hadi", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let storage = InMemoryStorage::new();
        let err = storage
            .update_user(User::new("ghost", "ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_protocol_active_filter() {
        let storage = InMemoryStorage::new();
        let mut active = ProtocolTemplate {
            slug: ProtocolSlug::new("breath-ladder"),
            name: "Breath Ladder".to_string(),
            description: "Guided breathing across levels".to_string(),
            duration_minutes: 15,
            difficulty_level: "beginner".to_string(),
            category: "breathing".to_string(),
            steps: vec!["settle".to_string(), "climb".to_string()],
            is_active: true,
            created_at: Utc::now(),
        };
        storage.upsert_protocol(active.clone()).await.unwrap();

        active.slug = ProtocolSlug::new("deep-scan");
        active.is_active = false;
        storage.upsert_protocol(active).await.unwrap();

        assert_eq!(storage.list_protocols(true).await.unwrap().len(), 1);
        assert_eq!(storage.list_protocols(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let storage = InMemoryStorage::new();
        let session = ProtocolSession::start(
            UserId::generate(),
            ProtocolSlug::new("breath-ladder"),
            15,
        );
        let id = session.id.clone();
        storage.create_session(session).await.unwrap();

        let completed = storage
            .complete_session(&id, Utc::now(), Some(0.12))
            .await
            .unwrap();
        assert!(completed.is_completed);
        assert_eq!(completed.coherence_improvement, Some(0.12));

        let err = storage
            .complete_session(&id, Utc::now(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvariantViolation(_)));

        let missing = SessionId::generate();
        let err = storage
            .complete_session(&missing, Utc::now(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_logs_ordering_and_limit() {
        let storage = InMemoryStorage::new();
        storage.append_log(sample_log(None, 0.2, 30)).await.unwrap();
        storage.append_log(sample_log(None, 0.4, 20)).await.unwrap();
        storage.append_log(sample_log(None, 0.6, 10)).await.unwrap();

        let recent = storage
            .list_recent_logs(QueryWindow::limited(2))
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
        // newest first
        assert!(recent[0].created_at > recent[1].created_at);
        assert!((recent[0].sfrc_score.value() - 0.6).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_logs_for_user_filters() {
        let storage = InMemoryStorage::new();
        let user = UserId::generate();
        storage
            .append_log(sample_log(Some(user.clone()), 0.5, 10))
            .await
            .unwrap();
        storage.append_log(sample_log(None, 0.9, 5)).await.unwrap();

        let logs = storage
            .list_logs_for_user(&user, QueryWindow::default())
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, Some(user));
    }

    #[tokio::test]
    async fn test_coherence_stats() {
        let storage = InMemoryStorage::new();
        let empty = storage.coherence_stats().await.unwrap();
        assert_eq!(empty.total_logs, 0);
        assert_eq!(empty.average_sfrc, 0.0);

        storage.append_log(sample_log(None, 0.2, 2)).await.unwrap();
        storage.append_log(sample_log(None, 0.6, 1)).await.unwrap();

        let stats = storage.coherence_stats().await.unwrap();
        assert_eq!(stats.total_logs, 2);
        assert!((stats.average_sfrc - 0.4).abs() < 1e-12);
    }
}
