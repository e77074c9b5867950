//! Session Guard
//!
//! The default [`Guard`] implementation: credentials are checked against
//! the user store, identity is bound to the server-side session, and
//! persistent logins are issued as a recaller cookie valued
//! `"{id}|{remember_token}|{password_hash}"`.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{session::Session, user::User};
use crate::domain::guard::{Attempt, Credentials, Guard, RememberCookie};
use crate::domain::repository::UserStore;
use crate::domain::value_object::{email::Email, password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Session-backed guard over a user store
pub struct SessionGuard<U>
where
    U: UserStore,
{
    user_store: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> SessionGuard<U>
where
    U: UserStore + Send + Sync,
{
    pub fn new(user_store: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_store, config }
    }

    /// Look up the user and verify the password.
    ///
    /// A malformed email, an unknown email, and a wrong password all
    /// return `InvalidCredentials`; callers cannot tell them apart.
    async fn verify_credentials(&self, credentials: &Credentials) -> AuthResult<User> {
        let user = match Email::new(&credentials.email) {
            Ok(email) => self.user_store.find_by_email(&email).await?,
            Err(_) => None,
        };

        let user = user.ok_or(AuthError::InvalidCredentials)?;

        let raw = RawPassword::new(credentials.password.clone())
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !user.password_hash.verify(&raw, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Reuse the stored remember token or mint one, then build the cookie.
    async fn issue_recaller(&self, user: &mut User) -> AuthResult<RememberCookie> {
        let token = match &user.remember_token {
            Some(token) => token.clone(),
            None => {
                let token = platform::token::remember_token();
                self.user_store
                    .update_remember_token(user.id, Some(&token))
                    .await?;
                user.remember_token = Some(token.clone());
                token
            }
        };

        Ok(RememberCookie {
            name: self.recaller_name().to_string(),
            value: format!("{}|{}|{}", user.id, token, user.password_hash.as_phc_string()),
        })
    }
}

impl<U> Guard for SessionGuard<U>
where
    U: UserStore + Send + Sync,
{
    async fn attempt(
        &self,
        session: &mut Session,
        credentials: Credentials,
        remember: bool,
    ) -> AuthResult<Attempt> {
        let mut user = self.verify_credentials(&credentials).await?;

        let recaller = if remember {
            Some(self.issue_recaller(&mut user).await?)
        } else {
            None
        };

        self.login(session, &user);

        Ok(Attempt {
            user,
            remember: recaller,
        })
    }

    async fn validate(&self, credentials: &Credentials) -> AuthResult<bool> {
        match self.verify_credentials(credentials).await {
            Ok(_) => Ok(true),
            Err(AuthError::InvalidCredentials) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn login(&self, session: &mut Session, user: &User) {
        session.login(user.id);

        tracing::info!(
            user_id = user.id,
            session_id = %session.session_id,
            "User authenticated"
        );
    }

    fn logout(&self, session: &mut Session) {
        let user_id = session.user_id();
        session.logout();

        if let Some(user_id) = user_id {
            tracing::info!(user_id, "User signed out");
        }
    }

    async fn user(&self, session: &Session) -> AuthResult<Option<User>> {
        match session.user_id() {
            Some(id) => self.user_store.find_by_id(id).await,
            None => Ok(None),
        }
    }

    fn check(&self, session: &Session) -> bool {
        session.is_authenticated()
    }

    fn recaller_name(&self) -> &str {
        &self.config.recaller_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::NewUser;
    use crate::domain::value_object::password::UserPassword;
    use crate::infra::memory::InMemoryAuthStore;

    async fn guard_with_user(email: &str, password: &str) -> (SessionGuard<InMemoryAuthStore>, User)
    {
        let store = Arc::new(InMemoryAuthStore::new());
        let config = Arc::new(AuthConfig::development());

        let raw = RawPassword::new(password.to_string()).unwrap();
        let hash = UserPassword::from_raw(&raw, None).unwrap();
        let user = store
            .create(NewUser::new("Joe", Email::new(email).unwrap(), hash))
            .await
            .unwrap();

        (SessionGuard::new(store, config), user)
    }

    #[tokio::test]
    async fn test_attempt_with_correct_credentials() {
        let (guard, user) = guard_with_user("joe@test.com", "i-love-rustaceans").await;
        let mut session = Session::new();

        let attempt = guard
            .attempt(
                &mut session,
                Credentials {
                    email: "joe@test.com".to_string(),
                    password: "i-love-rustaceans".to_string(),
                },
                false,
            )
            .await
            .unwrap();

        assert_eq!(attempt.user.id, user.id);
        assert!(attempt.remember.is_none());
        assert!(guard.check(&session));
        assert_eq!(session.user_id(), Some(user.id));
    }

    #[tokio::test]
    async fn test_attempt_failures_are_indistinguishable() {
        let (guard, _) = guard_with_user("joe@test.com", "i-love-rustaceans").await;
        let mut session = Session::new();

        let wrong_password = guard
            .attempt(
                &mut session,
                Credentials {
                    email: "joe@test.com".to_string(),
                    password: "invalid-password".to_string(),
                },
                false,
            )
            .await
            .unwrap_err();

        let unknown_user = guard
            .attempt(
                &mut session,
                Credentials {
                    email: "nobody@test.com".to_string(),
                    password: "i-love-rustaceans".to_string(),
                },
                false,
            )
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(!guard.check(&session));
    }

    #[tokio::test]
    async fn test_remember_issues_recaller_cookie() {
        let (guard, user) = guard_with_user("joe@test.com", "i-love-rustaceans").await;
        let mut session = Session::new();

        let attempt = guard
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

        let cookie = attempt.remember.unwrap();
        assert_eq!(cookie.name, guard.recaller_name());

        let token = attempt.user.remember_token.as_deref().unwrap();
        assert_eq!(token.len(), platform::token::REMEMBER_TOKEN_LENGTH);
        assert_eq!(
            cookie.value,
            format!(
                "{}|{}|{}",
                user.id,
                token,
                attempt.user.password_hash.as_phc_string()
            )
        );
    }

    #[tokio::test]
    async fn test_remember_token_reused_on_second_login() {
        let (guard, _) = guard_with_user("joe@test.com", "i-love-rustaceans").await;

        let credentials = || Credentials {
            email: "joe@test.com".to_string(),
            password: "i-love-rustaceans".to_string(),
        };

        let mut session = Session::new();
        let first = guard.attempt(&mut session, credentials(), true).await.unwrap();

        let mut session = Session::new();
        let second = guard.attempt(&mut session, credentials(), true).await.unwrap();

        assert_eq!(
            first.user.remember_token,
            second.user.remember_token
        );
        assert_eq!(first.remember, second.remember);
    }

    #[tokio::test]
    async fn test_validate_does_not_touch_session() {
        let (guard, _) = guard_with_user("joe@test.com", "i-love-rustaceans").await;

        assert!(guard
            .validate(&Credentials {
                email: "joe@test.com".to_string(),
                password: "i-love-rustaceans".to_string(),
            })
            .await
            .unwrap());

        assert!(!guard
            .validate(&Credentials {
                email: "joe@test.com".to_string(),
                password: "invalid-password".to_string(),
            })
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_user_query() {
        let (guard, user) = guard_with_user("joe@test.com", "i-love-rustaceans").await;
        let mut session = Session::new();

        assert!(guard.user(&session).await.unwrap().is_none());

        guard.login(&mut session, &user);
        let current = guard.user(&session).await.unwrap().unwrap();
        assert_eq!(current.id, user.id);
    }
}
