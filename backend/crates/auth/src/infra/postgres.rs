//! PostgreSQL Store Implementations

use chrono::{DateTime, Duration, Utc};
use kernel::id::SessionId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    session::{Session, SessionData},
    user::{NewUser, User},
};
use crate::domain::repository::{SessionStore, UserStore};
use crate::domain::value_object::{email::Email, password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth store
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Store Implementation
// ============================================================================

impl UserStore for PgAuthStore {
    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                name,
                email,
                password_hash,
                remember_token,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, NULL, NOW(), NOW())
            RETURNING
                id,
                name,
                email,
                password_hash,
                remember_token,
                created_at,
                updated_at
            "#,
        )
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .fetch_one(&self.pool)
        .await?;

        row.into_user()
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                email,
                password_hash,
                remember_token,
                created_at,
                updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                name,
                email,
                password_hash,
                remember_token,
                created_at,
                updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update_remember_token(&self, id: i64, token: Option<&str>) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                remember_token = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

impl SessionStore for PgAuthStore {
    async fn load(&self, session_id: SessionId) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                payload,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn save(&self, session: &Session) -> AuthResult<()> {
        let payload = serde_json::to_value(session.data())
            .map_err(|e| AuthError::Internal(format!("Session payload encoding failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                payload,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                payload = EXCLUDED.payload,
                last_activity_at = EXCLUDED.last_activity_at
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(payload)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self, idle_ttl: Duration) -> AuthResult<u64> {
        let cutoff = Utc::now() - idle_ttl;

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE last_activity_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up idle sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    remember_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid stored password hash: {e}")))?;

        Ok(User {
            id: self.id,
            name: self.name,
            email: Email::from_db(self.email),
            password_hash,
            remember_token: self.remember_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<Session> {
        let data: SessionData = serde_json::from_value(self.payload)
            .map_err(|e| AuthError::Internal(format!("Session payload decoding failed: {e}")))?;

        Ok(Session::from_stored(
            SessionId::from_uuid(self.session_id),
            data,
            self.created_at,
            self.last_activity_at,
        ))
    }
}
