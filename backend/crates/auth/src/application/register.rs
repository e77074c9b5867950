//! Register Use Case
//!
//! Validates the registration form, creates the user with a hashed
//! password, and establishes an authenticated session for it.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_guard::SessionGuard;
use crate::domain::entity::session::Session;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::guard::Guard;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{
    email::Email,
    password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult, ValidationErrors};

/// Maximum length of the display name
const NAME_MAX_LENGTH: usize = 255;

/// Registration input
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserStore,
{
    user_store: Arc<U>,
    guard: SessionGuard<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserStore + Send + Sync,
{
    pub fn new(user_store: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self {
            guard: SessionGuard::new(user_store.clone(), config.clone()),
            user_store,
            config,
        }
    }

    pub async fn execute(&self, session: &mut Session, input: RegisterInput) -> AuthResult<User> {
        let mut errors = ValidationErrors::new();

        // Name
        let name = input.name.trim().to_string();
        if name.is_empty() {
            errors.add("name", "The name field is required.");
        } else if name.chars().count() > NAME_MAX_LENGTH {
            errors.add(
                "name",
                format!("The name may not be greater than {NAME_MAX_LENGTH} characters."),
            );
        }

        // Email: format first, then uniqueness
        let email = match Email::new(&input.email) {
            Ok(email) => {
                if self.user_store.exists_by_email(&email).await? {
                    errors.add("email", "The email has already been taken.");
                    None
                } else {
                    Some(email)
                }
            }
            Err(e) => {
                errors.add("email", e.to_string());
                None
            }
        };

        // Password: confirmation match plus platform policy
        if input.password != input.password_confirmation {
            errors.add("password", "The password confirmation does not match.");
        }
        let password = match RawPassword::new(input.password) {
            Ok(raw) => Some(raw),
            Err(e) => {
                errors.add("password", e.to_string());
                None
            }
        };

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        // All three are present when validation produced no errors.
        let (email, password) = match (email, password) {
            (Some(email), Some(password)) => (email, password),
            _ => return Err(AuthError::Internal("Validation state mismatch".to_string())),
        };

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;

        let user = self
            .user_store
            .create(NewUser::new(name, email, password_hash))
            .await?;

        // A freshly registered user is signed in immediately.
        self.guard.login(session, &user);

        tracing::info!(user_id = user.id, email = %user.email, "User registered");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAuthStore;

    fn use_case() -> (Arc<InMemoryAuthStore>, RegisterUseCase<InMemoryAuthStore>) {
        let store = Arc::new(InMemoryAuthStore::new());
        let config = Arc::new(AuthConfig::development());
        (store.clone(), RegisterUseCase::new(store, config))
    }

    fn valid_input() -> RegisterInput {
        RegisterInput {
            name: "Joe".to_string(),
            email: "testemail@test.com".to_string(),
            password: "passwordtest".to_string(),
            password_confirmation: "passwordtest".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_authenticates() {
        let (store, use_case) = use_case();
        let mut session = Session::new();

        let user = use_case.execute(&mut session, valid_input()).await.unwrap();

        assert_eq!(user.name, "Joe");
        assert_eq!(user.email.as_str(), "testemail@test.com");
        assert_eq!(session.user_id(), Some(user.id));

        let stored = store
            .find_by_email(&Email::new("testemail@test.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_confirmation() {
        let (_, use_case) = use_case();
        let mut session = Session::new();

        let input = RegisterInput {
            password_confirmation: "somethingelse".to_string(),
            ..valid_input()
        };

        let err = use_case.execute(&mut session, input).await.unwrap_err();
        match err {
            AuthError::Validation(errors) => {
                assert_eq!(errors.messages_for("password").len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let (_, use_case) = use_case();

        let mut session = Session::new();
        use_case.execute(&mut session, valid_input()).await.unwrap();

        let mut session = Session::new();
        let err = use_case
            .execute(&mut session, valid_input())
            .await
            .unwrap_err();
        match err {
            AuthError::Validation(errors) => {
                assert_eq!(
                    errors.messages_for("email"),
                    &["The email has already been taken.".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_collects_all_field_errors() {
        let (_, use_case) = use_case();
        let mut session = Session::new();

        let input = RegisterInput {
            name: "   ".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            password_confirmation: "short".to_string(),
        };

        let err = use_case.execute(&mut session, input).await.unwrap_err();
        match err {
            AuthError::Validation(errors) => {
                assert!(!errors.messages_for("name").is_empty());
                assert!(!errors.messages_for("email").is_empty());
                assert!(!errors.messages_for("password").is_empty());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
