//! Form DTOs
//!
//! Bodies arrive as `application/x-www-form-urlencoded` via `axum::Form`.

use serde::Deserialize;

/// POST /login body
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox field; browsers send `remember=on` when ticked and omit the
    /// field entirely when not.
    #[serde(default)]
    pub remember: Option<String>,
}

impl LoginForm {
    pub fn remember_requested(&self) -> bool {
        matches!(
            self.remember.as_deref(),
            Some("on") | Some("1") | Some("true")
        )
    }
}

/// POST /register body
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(remember: Option<&str>) -> LoginForm {
        LoginForm {
            email: "joe@test.com".to_string(),
            password: "secret".to_string(),
            remember: remember.map(str::to_string),
        }
    }

    #[test]
    fn test_remember_checkbox_values() {
        assert!(form(Some("on")).remember_requested());
        assert!(form(Some("1")).remember_requested());
        assert!(form(Some("true")).remember_requested());
    }

    #[test]
    fn test_remember_absent_or_unknown_is_false() {
        assert!(!form(None).remember_requested());
        assert!(!form(Some("off")).remember_requested());
        assert!(!form(Some("")).remember_requested());
    }
}
