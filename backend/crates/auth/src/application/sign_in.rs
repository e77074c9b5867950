//! Sign In Use Case
//!
//! Authenticates a user against the user store and binds the session.
//! Flash bookkeeping on failure (old input, field errors) is the caller's
//! responsibility; this use case only reports `InvalidCredentials`.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_guard::SessionGuard;
use crate::domain::entity::session::Session;
use crate::domain::entity::user::User;
use crate::domain::guard::{Credentials, Guard, RememberCookie};
use crate::domain::repository::UserStore;
use crate::error::AuthResult;

/// Sign in input
#[derive(Debug)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
    /// Remember me flag
    pub remember: bool,
}

/// Sign in output
pub struct SignInOutput {
    pub user: User,
    /// Recaller cookie to set when "remember me" was requested
    pub remember_cookie: Option<RememberCookie>,
}

/// Sign in use case
pub struct SignInUseCase<U>
where
    U: UserStore,
{
    guard: SessionGuard<U>,
}

impl<U> SignInUseCase<U>
where
    U: UserStore + Send + Sync,
{
    pub fn new(user_store: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self {
            guard: SessionGuard::new(user_store, config),
        }
    }

    pub async fn execute(
        &self,
        session: &mut Session,
        input: SignInInput,
    ) -> AuthResult<SignInOutput> {
        let credentials = Credentials {
            email: input.email,
            password: input.password,
        };

        let attempt = self.guard.attempt(session, credentials, input.remember).await?;

        tracing::info!(
            user_id = attempt.user.id,
            remember = input.remember,
            "User signed in"
        );

        Ok(SignInOutput {
            user: attempt.user,
            remember_cookie: attempt.remember,
        })
    }
}
