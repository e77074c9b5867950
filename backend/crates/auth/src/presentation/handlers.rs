//! HTTP Handlers
//!
//! Browser-facing flow: every response is either a rendered page or a 302
//! redirect, with failures recovered into flash state on the session.

use axum::extract::{Form, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginFormDecision, RegisterInput, RegisterUseCase, SignInInput, SignInUseCase, SignOutUseCase,
    ViewLoginFormUseCase,
};
use crate::domain::guard::Guard;
use crate::application::session_guard::SessionGuard;
use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionStore, UserStore};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginForm, RegisterForm};
use crate::presentation::session_layer::{
    clear_recaller_header, open_session, persist_session, recaller_cookie_header,
    session_cookie_header,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// 302 redirect. `axum::response::Redirect` emits 303/307; the classic
/// form-login flow uses 302 Found.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn with_cookies(mut response: Response, cookies: &[String]) -> Response {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

// ============================================================================
// Login Form
// ============================================================================

/// GET /login
pub async fn show_login_form<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    let session = open_session(&*state.store, &state.config, &headers).await?;
    let opened_id = session.session_id;

    let use_case = ViewLoginFormUseCase::new(state.config.clone());
    let decision = use_case.decide(&session);

    persist_session(&*state.store, &session, opened_id).await?;
    let session_cookie = session_cookie_header(&state.config, &session);

    let response = match decision {
        LoginFormDecision::Redirect(path) => found(&path),
        LoginFormDecision::RenderForm => {
            Html(render_login_form(&session)).into_response()
        }
    };

    Ok(with_cookies(response, &[session_cookie]))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /login
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> AuthResult<Response>
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    let mut session = open_session(&*state.store, &state.config, &headers).await?;
    let opened_id = session.session_id;

    let remember = form.remember_requested();
    let use_case = SignInUseCase::new(state.store.clone(), state.config.clone());

    let input = SignInInput {
        email: form.email.clone(),
        password: form.password,
        remember,
    };

    match use_case.execute(&mut session, input).await {
        Ok(output) => {
            persist_session(&*state.store, &session, opened_id).await?;

            let mut cookies = vec![session_cookie_header(&state.config, &session)];
            if let Some(remember_cookie) = output.remember_cookie {
                cookies.push(recaller_cookie_header(&state.config, &remember_cookie));
            }

            Ok(with_cookies(found(&state.config.home_path), &cookies))
        }
        Err(err @ AuthError::InvalidCredentials) => {
            // The failed attempt is keyed to the email field; the submitted
            // password is never flashed back.
            session.flash_error("email", err.to_string());
            session.flash_old_input("email", form.email);

            persist_session(&*state.store, &session, opened_id).await?;
            let session_cookie = session_cookie_header(&state.config, &session);

            Ok(with_cookies(found(&state.config.login_path), &[session_cookie]))
        }
        Err(other) => Err(other),
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> AuthResult<Response>
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    let mut session = open_session(&*state.store, &state.config, &headers).await?;
    let opened_id = session.session_id;

    let use_case = RegisterUseCase::new(state.store.clone(), state.config.clone());

    let input = RegisterInput {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password,
        password_confirmation: form.password_confirmation,
    };

    match use_case.execute(&mut session, input).await {
        Ok(_user) => {
            persist_session(&*state.store, &session, opened_id).await?;
            let session_cookie = session_cookie_header(&state.config, &session);

            Ok(with_cookies(found(&state.config.home_path), &[session_cookie]))
        }
        Err(AuthError::Validation(errors)) => {
            for (field, messages) in errors.iter() {
                for message in messages {
                    session.flash_error(field, message.clone());
                }
            }
            session.flash_old_input("name", form.name);
            session.flash_old_input("email", form.email);

            persist_session(&*state.store, &session, opened_id).await?;
            let session_cookie = session_cookie_header(&state.config, &session);

            Ok(with_cookies(found(&state.config.login_path), &[session_cookie]))
        }
        Err(other) => Err(other),
    }
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /logout
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    let mut session = open_session(&*state.store, &state.config, &headers).await?;
    let opened_id = session.session_id;

    let use_case = SignOutUseCase::new(state.store.clone(), state.config.clone());
    use_case.execute(&mut session).await?;

    persist_session(&*state.store, &session, opened_id).await?;

    let cookies = [
        session_cookie_header(&state.config, &session),
        clear_recaller_header(&state.config),
    ];

    Ok(with_cookies(found(&state.config.login_path), &cookies))
}

// ============================================================================
// Home
// ============================================================================

/// GET /home
pub async fn home<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: UserStore + SessionStore + Clone + Send + Sync + 'static,
{
    let session = open_session(&*state.store, &state.config, &headers).await?;
    let opened_id = session.session_id;

    let guard = SessionGuard::new(state.store.clone(), state.config.clone());
    let user = guard.user(&session).await?;

    persist_session(&*state.store, &session, opened_id).await?;
    let session_cookie = session_cookie_header(&state.config, &session);

    let response = match user {
        Some(user) => Html(render_home(&user.name)).into_response(),
        None => found(&state.config.login_path),
    };

    Ok(with_cookies(response, &[session_cookie]))
}

// ============================================================================
// Minimal inline pages
// ============================================================================

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_login_form(session: &Session) -> String {
    let mut errors = String::new();
    for message in session.errors_for("email") {
        errors.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            escape_html(message)
        ));
    }

    let old_email = session
        .old_input("email")
        .map(escape_html)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Login</title></head>
<body>
{errors}<form method="post" action="/login">
<input type="email" name="email" value="{old_email}">
<input type="password" name="password" value="">
<label><input type="checkbox" name="remember"> Remember me</label>
<button type="submit">Login</button>
</form>
</body>
</html>
"#
    )
}

fn render_home(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Home</title></head>
<body>
<p>Welcome back, {}.</p>
<form method="post" action="/logout"><button type="submit">Logout</button></form>
</body>
</html>
"#,
        escape_html(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>"x"&'y'</script>"#),
            "&lt;script&gt;&quot;x&quot;&amp;&#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_login_form_shows_flashed_state() {
        let mut session = Session::new();
        session.flash_error("email", "These credentials do not match our records");
        session.flash_old_input("email", "joe@test.com");
        session.age();

        let html = render_login_form(&session);
        assert!(html.contains("These credentials do not match our records"));
        assert!(html.contains(r#"value="joe@test.com""#));
        // The password field is always rendered empty.
        assert!(html.contains(r#"name="password" value="""#));
    }
}
