//! User Entity
//!
//! The persisted account record. The store owns the integer id; the façade
//! only ever reads the row and updates `remember_token`.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, password::UserPassword};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Store-assigned integer identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address (unique, login identifier)
    pub email: Email,
    /// Argon2id PHC hash
    pub password_hash: UserPassword,
    /// Persistent-login token, set once "remember me" has been used
    pub remember_token: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

/// A user that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: UserPassword,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: Email, password_hash: UserPassword) -> Self {
        Self {
            name: name.into(),
            email,
            password_hash,
        }
    }

    /// Promote to a full entity once the store has assigned an id.
    pub fn into_user(self, id: i64) -> User {
        let now = Utc::now();
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            remember_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::password::RawPassword;

    fn password() -> UserPassword {
        let raw = RawPassword::new("i-love-rustaceans".to_string()).unwrap();
        UserPassword::from_raw(&raw, None).unwrap()
    }

    #[test]
    fn test_new_user_promotion() {
        let email = Email::new("joe@test.com").unwrap();
        let new_user = NewUser::new("Joe", email.clone(), password());

        let user = new_user.into_user(7);
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Joe");
        assert_eq!(user.email, email);
        assert!(user.remember_token.is_none());
    }
}
