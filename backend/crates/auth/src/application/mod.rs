//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login_form;
pub mod register;
pub mod session_guard;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;

pub use config::AuthConfig;
pub use login_form::{LoginFormDecision, ViewLoginFormUseCase};
pub use register::{RegisterInput, RegisterUseCase};
pub use session_guard::SessionGuard;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
