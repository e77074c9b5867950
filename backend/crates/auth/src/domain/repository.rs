//! Store Traits
//!
//! Interfaces for the external collaborators: the user store and the
//! session store. Implementations live in the infrastructure layer; the
//! façade is constructible against any pair of them.

use chrono::Duration;
use kernel::id::SessionId;

use crate::domain::entity::{
    session::Session,
    user::{NewUser, User},
};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User store trait
#[trait_variant::make(UserStore: Send)]
pub trait LocalUserStore {
    /// Persist a new user; the store assigns the integer id
    async fn create(&self, user: NewUser) -> AuthResult<User>;

    /// Find user by id
    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Update the remember token. Concurrent writes serialize at the store;
    /// last write wins.
    async fn update_remember_token(&self, id: i64, token: Option<&str>) -> AuthResult<()>;
}

/// Session store trait
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Load a session by id
    async fn load(&self, session_id: SessionId) -> AuthResult<Option<Session>>;

    /// Create or update a session
    async fn save(&self, session: &Session) -> AuthResult<()>;

    /// Delete a session
    async fn delete(&self, session_id: SessionId) -> AuthResult<()>;

    /// Delete sessions idle for longer than `idle_ttl`; returns the count
    async fn cleanup_expired(&self, idle_ttl: Duration) -> AuthResult<u64>;
}
