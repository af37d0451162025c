//! PostgreSQL adapter for FRC storage.
//!
//! Designed as the transactional source-of-truth backend. μ-level vectors
//! and protocol steps are stored as JSONB; everything queried by the API is
//! a plain column.

use crate::error::{StorageError, StorageResult};
use crate::model::{CoherenceLog, CoherenceStats, ProtocolSession, ProtocolTemplate, User};
use crate::traits::{
    CoherenceLogStore, ProtocolStore, QueryWindow, SessionStore, UserStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use frc_types::{CoherenceScore, LogId, MuLevels, ProtocolSlug, SessionId, UserId};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use uuid::Uuid;

/// PostgreSQL-backed storage adapter.
#[derive(Clone)]
pub struct PostgresFrcStorage {
    pool: PgPool,
}

impl PostgresFrcStorage {
    /// Connect to PostgreSQL and initialize required schema.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to connect postgres: {e}")))?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> StorageResult<()> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS frc_users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                full_name TEXT NOT NULL,
                is_active BOOLEAN NOT NULL,
                is_admin BOOLEAN NOT NULL,
                baseline_sfrc DOUBLE PRECISION NOT NULL,
                coherence_level TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS frc_protocols (
                slug TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                difficulty_level TEXT NOT NULL,
                category TEXT NOT NULL,
                steps JSONB NOT NULL,
                is_active BOOLEAN NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS frc_sessions (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                protocol_slug TEXT NOT NULL,
                started_at TIMESTAMPTZ NOT NULL,
                completed_at TIMESTAMPTZ,
                is_completed BOOLEAN NOT NULL,
                coherence_improvement DOUBLE PRECISION,
                duration_minutes INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS frc_coherence_logs (
                id UUID PRIMARY KEY,
                user_id UUID,
                mu_levels JSONB NOT NULL,
                sfrc_score DOUBLE PRECISION NOT NULL,
                context TEXT NOT NULL,
                calculation_method TEXT NOT NULL,
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        ];

        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresFrcStorage {
    async fn create_user(&self, user: User) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO frc_users
                (id, username, email, full_name, is_active, is_admin, baseline_sfrc, coherence_level, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(user.username)
        .bind(user.email)
        .bind(user.full_name)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.baseline_sfrc)
        .bind(user.coherence_level)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;

        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> StorageResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM frc_users WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(user_row_to_record).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM frc_users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(user_row_to_record).transpose()
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM frc_users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(user_row_to_record).collect()
    }

    async fn update_user(&self, user: User) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE frc_users
               SET username = $1,
                   email = $2,
                   full_name = $3,
                   is_active = $4,
                   is_admin = $5,
                   baseline_sfrc = $6,
                   coherence_level = $7
             WHERE id = $8
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.full_name)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.baseline_sfrc)
        .bind(user.coherence_level)
        .bind(*user.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "user {} not found",
                user.id
            )));
        }
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM frc_users WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProtocolStore for PostgresFrcStorage {
    async fn upsert_protocol(&self, protocol: ProtocolTemplate) -> StorageResult<()> {
        let steps = serde_json::to_value(&protocol.steps)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO frc_protocols
                (slug, name, description, duration_minutes, difficulty_level, category, steps, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                duration_minutes = EXCLUDED.duration_minutes,
                difficulty_level = EXCLUDED.difficulty_level,
                category = EXCLUDED.category,
                steps = EXCLUDED.steps,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(protocol.slug.as_str())
        .bind(protocol.name)
        .bind(protocol.description)
        .bind(to_i32(protocol.duration_minutes)?)
        .bind(protocol.difficulty_level)
        .bind(protocol.category)
        .bind(steps)
        .bind(protocol.is_active)
        .bind(protocol.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn get_protocol(&self, slug: &ProtocolSlug) -> StorageResult<Option<ProtocolTemplate>> {
        let row = sqlx::query("SELECT * FROM frc_protocols WHERE slug = $1")
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(protocol_row_to_record).transpose()
    }

    async fn list_protocols(&self, only_active: bool) -> StorageResult<Vec<ProtocolTemplate>> {
        let rows = if only_active {
            sqlx::query("SELECT * FROM frc_protocols WHERE is_active ORDER BY slug")
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query("SELECT * FROM frc_protocols ORDER BY slug")
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(protocol_row_to_record).collect()
    }

    async fn delete_protocol(&self, slug: &ProtocolSlug) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM frc_protocols WHERE slug = $1")
            .bind(slug.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SessionStore for PostgresFrcStorage {
    async fn create_session(&self, session: ProtocolSession) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO frc_sessions
                (id, user_id, protocol_slug, started_at, completed_at, is_completed, coherence_improvement, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*session.id.as_uuid())
        .bind(*session.user_id.as_uuid())
        .bind(session.protocol_slug.as_str())
        .bind(session.started_at)
        .bind(session.completed_at)
        .bind(session.is_completed)
        .bind(session.coherence_improvement)
        .bind(to_i32(session.duration_minutes)?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;

        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> StorageResult<Option<ProtocolSession>> {
        let row = sqlx::query("SELECT * FROM frc_sessions WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(session_row_to_record).transpose()
    }

    async fn list_recent_sessions(
        &self,
        window: QueryWindow,
    ) -> StorageResult<Vec<ProtocolSession>> {
        let rows = if window.limit == 0 {
            sqlx::query("SELECT * FROM frc_sessions ORDER BY started_at DESC OFFSET $1")
                .bind(to_i64(window.offset)?)
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query(
                "SELECT * FROM frc_sessions ORDER BY started_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(to_i64(window.limit)?)
            .bind(to_i64(window.offset)?)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(session_row_to_record).collect()
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Vec<ProtocolSession>> {
        let rows = sqlx::query(
            "SELECT * FROM frc_sessions WHERE user_id = $1 ORDER BY started_at DESC",
        )
        .bind(*user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(session_row_to_record).collect()
    }

    async fn complete_session(
        &self,
        id: &SessionId,
        completed_at: DateTime<Utc>,
        coherence_improvement: Option<f64>,
    ) -> StorageResult<ProtocolSession> {
        let result = sqlx::query(
            r#"
            UPDATE frc_sessions
               SET is_completed = TRUE,
                   completed_at = $1,
                   coherence_improvement = $2
             WHERE id = $3
               AND is_completed = FALSE
            "#,
        )
        .bind(completed_at)
        .bind(coherence_improvement)
        .bind(*id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            let exists = self.get_session(id).await?.is_some();
            if exists {
                return Err(StorageError::InvariantViolation(format!(
                    "session {} already completed",
                    id
                )));
            }
            return Err(StorageError::NotFound(format!("session {} not found", id)));
        }

        self.get_session(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("session {} not found", id)))
    }
}

#[async_trait]
impl CoherenceLogStore for PostgresFrcStorage {
    async fn append_log(&self, log: CoherenceLog) -> StorageResult<()> {
        let mu_levels = serde_json::to_value(log.mu_levels)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO frc_coherence_logs
                (id, user_id, mu_levels, sfrc_score, context, calculation_method, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*log.id.as_uuid())
        .bind(log.user_id.as_ref().map(|id| *id.as_uuid()))
        .bind(mu_levels)
        .bind(log.sfrc_score.value())
        .bind(log.context)
        .bind(log.calculation_method)
        .bind(log.notes)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;

        Ok(())
    }

    async fn get_log(&self, id: &LogId) -> StorageResult<Option<CoherenceLog>> {
        let row = sqlx::query("SELECT * FROM frc_coherence_logs WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(log_row_to_record).transpose()
    }

    async fn list_recent_logs(&self, window: QueryWindow) -> StorageResult<Vec<CoherenceLog>> {
        let rows = if window.limit == 0 {
            sqlx::query("SELECT * FROM frc_coherence_logs ORDER BY created_at DESC OFFSET $1")
                .bind(to_i64(window.offset)?)
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query(
                "SELECT * FROM frc_coherence_logs ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(to_i64(window.limit)?)
            .bind(to_i64(window.offset)?)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(log_row_to_record).collect()
    }

    async fn list_logs_for_user(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<CoherenceLog>> {
        let rows = if window.limit == 0 {
            sqlx::query(
                "SELECT * FROM frc_coherence_logs WHERE user_id = $1 ORDER BY created_at DESC OFFSET $2",
            )
            .bind(*user_id.as_uuid())
            .bind(to_i64(window.offset)?)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                "SELECT * FROM frc_coherence_logs WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            )
            .bind(*user_id.as_uuid())
            .bind(to_i64(window.limit)?)
            .bind(to_i64(window.offset)?)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(log_row_to_record).collect()
    }

    async fn coherence_stats(&self) -> StorageResult<CoherenceStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(AVG(sfrc_score), 0.0) AS average FROM frc_coherence_logs",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let average: f64 = row
            .try_get("average")
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(CoherenceStats {
            total_logs: total as u64,
            average_sfrc: average,
        })
    }
}

fn user_row_to_record(row: sqlx::postgres::PgRow) -> StorageResult<User> {
    Ok(User {
        id: UserId::from_uuid(get(&row, "id")?),
        username: get(&row, "username")?,
        email: get(&row, "email")?,
        full_name: get(&row, "full_name")?,
        is_active: get(&row, "is_active")?,
        is_admin: get(&row, "is_admin")?,
        baseline_sfrc: get(&row, "baseline_sfrc")?,
        coherence_level: get(&row, "coherence_level")?,
        created_at: get(&row, "created_at")?,
    })
}

fn protocol_row_to_record(row: sqlx::postgres::PgRow) -> StorageResult<ProtocolTemplate> {
    let steps_json: serde_json::Value = get(&row, "steps")?;
    let steps: Vec<String> = serde_json::from_value(steps_json)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let duration: i32 = get(&row, "duration_minutes")?;

    Ok(ProtocolTemplate {
        slug: ProtocolSlug::new(get::<String>(&row, "slug")?),
        name: get(&row, "name")?,
        description: get(&row, "description")?,
        duration_minutes: duration as u32,
        difficulty_level: get(&row, "difficulty_level")?,
        category: get(&row, "category")?,
        steps,
        is_active: get(&row, "is_active")?,
        created_at: get(&row, "created_at")?,
    })
}

fn session_row_to_record(row: sqlx::postgres::PgRow) -> StorageResult<ProtocolSession> {
    let duration: i32 = get(&row, "duration_minutes")?;

    Ok(ProtocolSession {
        id: SessionId::from_uuid(get(&row, "id")?),
        user_id: UserId::from_uuid(get(&row, "user_id")?),
        protocol_slug: ProtocolSlug::new(get::<String>(&row, "protocol_slug")?),
        started_at: get(&row, "started_at")?,
        completed_at: get(&row, "completed_at")?,
        is_completed: get(&row, "is_completed")?,
        coherence_improvement: get(&row, "coherence_improvement")?,
        duration_minutes: duration as u32,
    })
}

fn log_row_to_record(row: sqlx::postgres::PgRow) -> StorageResult<CoherenceLog> {
    let mu_json: serde_json::Value = get(&row, "mu_levels")?;
    let mu_levels: MuLevels = serde_json::from_value(mu_json)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let user_id: Option<Uuid> = get(&row, "user_id")?;

    Ok(CoherenceLog {
        id: LogId::from_uuid(get(&row, "id")?),
        user_id: user_id.map(UserId::from_uuid),
        mu_levels,
        sfrc_score: CoherenceScore::new(get(&row, "sfrc_score")?),
        context: get(&row, "context")?,
        calculation_method: get(&row, "calculation_method")?,
        notes: get(&row, "notes")?,
        created_at: get(&row, "created_at")?,
    })
}

fn get<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> StorageResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StorageError::Backend(e.to_string()))
}

fn map_sqlx_conflict(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StorageError::Conflict(db_err.message().to_string());
        }
    }
    StorageError::Backend(err.to_string())
}

fn to_i64(value: usize) -> StorageResult<i64> {
    i64::try_from(value)
        .map_err(|_| StorageError::InvalidInput("window value too large".to_string()))
}

fn to_i32(value: u32) -> StorageResult<i32> {
    i32::try_from(value)
        .map_err(|_| StorageError::InvalidInput("duration too large".to_string()))
}
