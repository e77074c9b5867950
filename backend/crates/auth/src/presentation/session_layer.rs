//! Session Cookie Plumbing
//!
//! Every handler opens the session from the signed cookie before running its
//! use case and persists it afterwards. Opening ages the flash data, so a
//! value flashed by the previous request becomes visible here and is gone
//! once this request's state is saved.

use axum::http::HeaderMap;
use kernel::id::SessionId;

use platform::cookie::{self, CookieConfig};

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::session::Session;
use crate::domain::guard::RememberCookie;
use crate::domain::repository::SessionStore;
use crate::error::AuthResult;

/// Load the session named by the signed cookie, or start a fresh guest
/// session. A missing, forged, or expired cookie is not an error; the
/// request simply proceeds unauthenticated.
pub async fn open_session<S>(
    store: &S,
    config: &AuthConfig,
    headers: &HeaderMap,
) -> AuthResult<Session>
where
    S: SessionStore + Sync,
{
    let token = cookie::extract_cookie(headers, &config.session_cookie_name);

    let stored = match token {
        Some(token) => match session_token::verify(&token, &config.session_secret) {
            Ok(session_id) => store.load(session_id).await?,
            Err(_) => {
                tracing::debug!("Session cookie failed verification; starting fresh");
                None
            }
        },
        None => None,
    };

    Ok(match stored {
        Some(mut session) => {
            session.age();
            session.touch();
            session
        }
        None => Session::new(),
    })
}

/// Save the session, dropping the old server-side record when the id was
/// rotated by login or logout.
pub async fn persist_session<S>(
    store: &S,
    session: &Session,
    opened_id: SessionId,
) -> AuthResult<()>
where
    S: SessionStore + Sync,
{
    if session.session_id != opened_id {
        store.delete(opened_id).await?;
    }
    store.save(session).await
}

fn session_cookie_config(config: &AuthConfig) -> CookieConfig {
    CookieConfig {
        name: config.session_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        // Session-lifetime cookie; idle expiry happens server side.
        max_age_secs: None,
    }
}

fn recaller_cookie_config(config: &AuthConfig, name: &str) -> CookieConfig {
    CookieConfig {
        name: name.to_string(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.remember_ttl.as_secs() as i64),
    }
}

/// `Set-Cookie` value carrying the signed session id.
pub fn session_cookie_header(config: &AuthConfig, session: &Session) -> String {
    let token = session_token::sign(&session.session_id, &config.session_secret);
    session_cookie_config(config).build_set_cookie(&token)
}

/// `Set-Cookie` value for the recaller ("remember me") cookie.
pub fn recaller_cookie_header(config: &AuthConfig, remember: &RememberCookie) -> String {
    recaller_cookie_config(config, &remember.name).build_set_cookie(&remember.value)
}

/// `Set-Cookie` value deleting the recaller cookie.
pub fn clear_recaller_header(config: &AuthConfig) -> String {
    recaller_cookie_config(config, &config.recaller_name).build_delete_cookie()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    use crate::infra::memory::InMemoryAuthStore;

    fn headers_with_session_cookie(config: &AuthConfig, session: &Session) -> HeaderMap {
        let token = session_token::sign(&session.session_id, &config.session_secret);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", config.session_cookie_name, token))
                .unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_no_cookie_opens_fresh_guest_session() {
        let store = InMemoryAuthStore::new();
        let config = AuthConfig::development();

        let session = open_session(&store, &config, &HeaderMap::new())
            .await
            .unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_signed_cookie_reopens_stored_session() {
        let store = InMemoryAuthStore::new();
        let config = AuthConfig::development();

        let mut session = Session::new();
        session.login(7);
        store.save(&session).await.unwrap();

        let headers = headers_with_session_cookie(&config, &session);
        let reopened = open_session(&store, &config, &headers).await.unwrap();
        assert_eq!(reopened.user_id(), Some(7));
    }

    #[tokio::test]
    async fn test_forged_cookie_opens_fresh_session() {
        let store = InMemoryAuthStore::new();
        let config = AuthConfig::development();

        let mut session = Session::new();
        session.login(7);
        store.save(&session).await.unwrap();

        // Same session id, signed with a different secret.
        let other = AuthConfig::development();
        let headers = headers_with_session_cookie(&other, &session);

        let reopened = open_session(&store, &config, &headers).await.unwrap();
        assert!(!reopened.is_authenticated());
    }

    #[tokio::test]
    async fn test_persist_drops_rotated_record() {
        let store = InMemoryAuthStore::new();

        let mut session = Session::new();
        let guest_id = session.session_id;
        store.save(&session).await.unwrap();

        session.login(7);
        persist_session(&store, &session, guest_id).await.unwrap();

        assert!(store.load(guest_id).await.unwrap().is_none());
        assert!(store.load(session.session_id).await.unwrap().is_some());
    }

    #[test]
    fn test_session_cookie_has_no_max_age() {
        let config = AuthConfig::development();
        let header = session_cookie_header(&config, &Session::new());
        assert!(header.starts_with("portal_session="));
        assert!(header.contains("HttpOnly"));
        assert!(!header.contains("Max-Age"));
    }

    #[test]
    fn test_recaller_cookie_carries_ttl_and_raw_value() {
        let config = AuthConfig::development();
        let remember = RememberCookie {
            name: config.recaller_name.clone(),
            value: "42|AbC123|$argon2id$stub".to_string(),
        };

        let header = recaller_cookie_header(&config, &remember);
        assert!(header.starts_with("remember_portal=42|AbC123|$argon2id$stub"));
        assert!(header.contains(&format!("Max-Age={}", 30 * 24 * 3600)));
    }
}
