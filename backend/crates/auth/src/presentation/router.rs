//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionStore, UserStore};
use crate::infra::postgres::PgAuthStore;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the auth router for any store implementation
pub fn auth_router<R>(store: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    let state = AuthAppState { store, config };

    Router::new()
        .route(
            "/login",
            get(handlers::show_login_form::<R>).post(handlers::sign_in::<R>),
        )
        .route("/register", post(handlers::register::<R>))
        .route("/logout", post(handlers::sign_out::<R>))
        .route("/home", get(handlers::home::<R>))
        .with_state(state)
}

/// Create the auth router backed by PostgreSQL
pub fn pg_auth_router(pool: PgPool, config: AuthConfig) -> Router {
    auth_router(Arc::new(PgAuthStore::new(pool)), Arc::new(config))
}
