//! Sign Out Use Case
//!
//! Unbinds the session and cycles the remember token so outstanding
//! recaller cookies stop working.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_guard::SessionGuard;
use crate::domain::entity::session::Session;
use crate::domain::guard::Guard;
use crate::domain::repository::UserStore;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<U>
where
    U: UserStore,
{
    user_store: Arc<U>,
    guard: SessionGuard<U>,
}

impl<U> SignOutUseCase<U>
where
    U: UserStore + Send + Sync,
{
    pub fn new(user_store: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self {
            guard: SessionGuard::new(user_store.clone(), config),
            user_store,
        }
    }

    pub async fn execute(&self, session: &mut Session) -> AuthResult<()> {
        // Cycle the remember token before dropping the binding; a stolen
        // recaller cookie dies with the session.
        if let Some(user) = self.guard.user(session).await? {
            if user.remember_token.is_some() {
                let fresh = platform::token::remember_token();
                self.user_store
                    .update_remember_token(user.id, Some(&fresh))
                    .await?;
            }
        }

        self.guard.logout(session);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::NewUser;
    use crate::domain::guard::Credentials;
    use crate::domain::value_object::{
        email::Email,
        password::{RawPassword, UserPassword},
    };
    use crate::infra::memory::InMemoryAuthStore;

    #[tokio::test]
    async fn test_sign_out_unbinds_and_cycles_remember_token() {
        let store = Arc::new(InMemoryAuthStore::new());
        let config = Arc::new(AuthConfig::development());

        let raw = RawPassword::new("i-love-rustaceans".to_string()).unwrap();
        let hash = UserPassword::from_raw(&raw, None).unwrap();
        let user = store
            .create(NewUser::new(
                "Joe",
                Email::new("joe@test.com").unwrap(),
                hash,
            ))
            .await
            .unwrap();

        // Remembered login first, so a token exists.
        let guard = SessionGuard::new(store.clone(), config.clone());
        let mut session = Session::new();
        guard
            .attempt(
                &mut session,
                Credentials {
                    email: "joe@test.com".to_string(),
                    password: "i-love-rustaceans".to_string(),
                },
                true,
            )
            .await
            .unwrap();

        let token_before = store
            .find_by_id(user.id)
            .await
            .unwrap()
            .unwrap()
            .remember_token;
        assert!(token_before.is_some());

        let use_case = SignOutUseCase::new(store.clone(), config);
        use_case.execute(&mut session).await.unwrap();

        assert!(!session.is_authenticated());

        let token_after = store
            .find_by_id(user.id)
            .await
            .unwrap()
            .unwrap()
            .remember_token;
        assert!(token_after.is_some());
        assert_ne!(token_before, token_after);
    }

    #[tokio::test]
    async fn test_sign_out_on_guest_session_is_noop() {
        let store = Arc::new(InMemoryAuthStore::new());
        let config = Arc::new(AuthConfig::development());

        let use_case = SignOutUseCase::new(store, config);
        let mut session = Session::new();
        use_case.execute(&mut session).await.unwrap();

        assert!(!session.is_authenticated());
    }
}
