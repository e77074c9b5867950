//! Guard Abstraction
//!
//! A guard is the authentication strategy for a session: it validates
//! credentials, binds/unbinds the session, answers identity queries, and
//! names the cookie used for persistent logins. Modeled as a capability
//! trait so alternative strategies stay drop-in.

use std::fmt;

use crate::domain::entity::{session::Session, user::User};
use crate::error::AuthResult;

/// Submitted login credentials. Transient; never persisted.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Persistent-login cookie the caller must set on the response.
///
/// The value is exactly `"{id}|{remember_token}|{password_hash}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberCookie {
    pub name: String,
    pub value: String,
}

/// Successful credential check, with an optional recaller cookie when
/// "remember me" was requested.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub user: User,
    pub remember: Option<RememberCookie>,
}

/// Authentication strategy for a session
#[trait_variant::make(Guard: Send)]
pub trait LocalGuard {
    /// Validate credentials and, on success, bind the session to the
    /// matched user. When `remember` is set, issue a durable token and
    /// return the recaller cookie the caller must attach.
    async fn attempt(
        &self,
        session: &mut Session,
        credentials: Credentials,
        remember: bool,
    ) -> AuthResult<Attempt>;

    /// Check credentials without touching the session.
    async fn validate(&self, credentials: &Credentials) -> AuthResult<bool>;

    /// Bind an already-verified user to the session.
    fn login(&self, session: &mut Session, user: &User);

    /// Unbind the session.
    fn logout(&self, session: &mut Session);

    /// The currently authenticated user, if any.
    async fn user(&self, session: &Session) -> AuthResult<Option<User>>;

    /// Whether the session is authenticated.
    fn check(&self, session: &Session) -> bool;

    /// Cookie name used for persistent ("remember me") logins.
    fn recaller_name(&self) -> &str;
}
