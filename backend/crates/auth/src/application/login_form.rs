//! View Login Form Use Case
//!
//! An authenticated user must not be offered the credential form again;
//! the decision is made before any rendering.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;

/// What the web layer should do with a `GET /login`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFormDecision {
    /// Already authenticated; send the user home
    Redirect(String),
    /// Guest; render the credential form
    RenderForm,
}

/// View login form use case
pub struct ViewLoginFormUseCase {
    config: Arc<AuthConfig>,
}

impl ViewLoginFormUseCase {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub fn decide(&self, session: &Session) -> LoginFormDecision {
        if session.is_authenticated() {
            LoginFormDecision::Redirect(self.config.home_path.clone())
        } else {
            LoginFormDecision::RenderForm
        }
    }
}
