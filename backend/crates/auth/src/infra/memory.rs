//! In-Memory Store
//!
//! `Mutex<HashMap>`-backed implementation of both store traits. Used by the
//! test suite and for local development without a database. The mutex is
//! never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use kernel::id::SessionId;
use uuid::Uuid;

use crate::domain::entity::{
    session::Session,
    user::{NewUser, User},
};
use crate::domain::repository::{SessionStore, UserStore};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    next_user_id: i64,
    sessions: HashMap<Uuid, Session>,
}

/// In-memory auth store
#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AuthError::Internal("In-memory store mutex poisoned".to_string()))
    }

    /// Number of stored users (test helper)
    pub fn user_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.users.len()).unwrap_or(0)
    }
}

impl UserStore for InMemoryAuthStore {
    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let mut inner = self.lock()?;

        if inner
            .users
            .values()
            .any(|existing| existing.email == user.email)
        {
            // Mirrors the unique index on users.email
            return Err(AuthError::Internal("Duplicate email".to_string()));
        }

        inner.next_user_id += 1;
        let id = inner.next_user_id;

        let user = user.into_user(id);
        inner.users.insert(id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let inner = self.lock()?;
        Ok(inner
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let inner = self.lock()?;
        Ok(inner.users.values().any(|user| &user.email == email))
    }

    async fn update_remember_token(&self, id: i64, token: Option<&str>) -> AuthResult<()> {
        let mut inner = self.lock()?;

        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AuthError::Internal(format!("No user with id {id}")))?;

        user.remember_token = token.map(str::to_string);
        user.updated_at = Utc::now();

        Ok(())
    }
}

impl SessionStore for InMemoryAuthStore {
    async fn load(&self, session_id: SessionId) -> AuthResult<Option<Session>> {
        let inner = self.lock()?;
        Ok(inner.sessions.get(session_id.as_uuid()).cloned())
    }

    async fn save(&self, session: &Session) -> AuthResult<()> {
        let mut inner = self.lock()?;
        inner
            .sessions
            .insert(session.session_id.into_uuid(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> AuthResult<()> {
        let mut inner = self.lock()?;
        inner.sessions.remove(session_id.as_uuid());
        Ok(())
    }

    async fn cleanup_expired(&self, idle_ttl: Duration) -> AuthResult<u64> {
        let mut inner = self.lock()?;
        let cutoff = Utc::now() - idle_ttl;

        let before = inner.sessions.len();
        inner
            .sessions
            .retain(|_, session| session.last_activity_at >= cutoff);

        Ok((before - inner.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::password::{RawPassword, UserPassword};

    fn new_user(email: &str) -> NewUser {
        let raw = RawPassword::new("i-love-rustaceans".to_string()).unwrap();
        let hash = UserPassword::from_raw(&raw, None).unwrap();
        NewUser::new("Joe", Email::new(email).unwrap(), hash)
    }

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let store = InMemoryAuthStore::new();
        let first = store.create(new_user("a@test.com")).await.unwrap();
        let second = store.create(new_user("b@test.com")).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryAuthStore::new();
        store.create(new_user("a@test.com")).await.unwrap();
        assert!(store.create(new_user("a@test.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_remember_token_last_write_wins() {
        let store = InMemoryAuthStore::new();
        let user = store.create(new_user("a@test.com")).await.unwrap();

        store
            .update_remember_token(user.id, Some("first"))
            .await
            .unwrap();
        store
            .update_remember_token(user.id, Some("second"))
            .await
            .unwrap();

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.remember_token.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_session_roundtrip_and_delete() {
        let store = InMemoryAuthStore::new();

        let mut session = Session::new();
        session.login(1);
        store.save(&session).await.unwrap();

        let loaded = store.load(session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.user_id(), Some(1));

        store.delete(session.session_id).await.unwrap();
        assert!(store.load(session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let store = InMemoryAuthStore::new();

        let mut stale = Session::new();
        stale.last_activity_at = Utc::now() - Duration::hours(24);
        store.save(&stale).await.unwrap();

        let fresh = Session::new();
        store.save(&fresh).await.unwrap();

        let deleted = store.cleanup_expired(Duration::hours(12)).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.load(stale.session_id).await.unwrap().is_none());
        assert!(store.load(fresh.session_id).await.unwrap().is_some());
    }
}
