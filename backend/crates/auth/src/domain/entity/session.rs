//! Session Entity
//!
//! Server-side per-request session state: the user binding plus flash data
//! ("errors" and "old input") that survives exactly one redirect.
//!
//! Flash data lives in two generations. Writes land in the staged
//! generation; [`Session::age`] runs at the start of the next request,
//! promoting staged values to visible and dropping the previous visible
//! generation. Values not re-flashed therefore disappear after one request,
//! and repeated failures never accumulate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::SessionId;
use serde::{Deserialize, Serialize};

/// Serializable session payload, stored as JSON by the session store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated user, if any. The session is "authenticated" iff this
    /// holds exactly one user id.
    pub user_id: Option<i64>,
    #[serde(default)]
    pub errors: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub old_input: HashMap<String, String>,
    #[serde(default)]
    pub staged_errors: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub staged_old_input: HashMap<String, String>,
}

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4), rotated whenever the auth state changes
    pub session_id: SessionId,
    data: SessionData,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp, drives idle expiry cleanup
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh guest session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: SessionId::new(),
            data: SessionData::default(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Rehydrate from the store
    pub fn from_stored(
        session_id: SessionId,
        data: SessionData,
        created_at: DateTime<Utc>,
        last_activity_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            data,
            created_at,
            last_activity_at,
        }
    }

    /// Stored payload, for persistence
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    // ========================================================================
    // Authentication state
    // ========================================================================

    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.user_id.is_some()
    }

    /// Bind the session to a user. Rotates the session id so the
    /// pre-authentication cookie cannot be replayed.
    pub fn login(&mut self, user_id: i64) {
        self.data.user_id = Some(user_id);
        self.session_id = SessionId::new();
        self.touch();
    }

    /// Drop the user binding and all session state, rotating the id.
    pub fn logout(&mut self) {
        self.data = SessionData::default();
        self.session_id = SessionId::new();
        self.touch();
    }

    // ========================================================================
    // Flash data lifecycle
    // ========================================================================

    /// Promote staged flash data to visible and drop the previous
    /// generation. Called once at the start of each request.
    pub fn age(&mut self) {
        self.data.errors = std::mem::take(&mut self.data.staged_errors);
        self.data.old_input = std::mem::take(&mut self.data.staged_old_input);
    }

    /// Flash an error message for a field; visible on the next request.
    pub fn flash_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.data
            .staged_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Flash a submitted value for form re-population on the next request.
    /// Callers must never flash password fields.
    pub fn flash_old_input(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.data.staged_old_input.insert(field.into(), value.into());
    }

    /// Error messages visible during this request.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.data.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_errors(&self) -> bool {
        !self.data.errors.is_empty()
    }

    /// Old input visible during this request.
    pub fn old_input(&self, field: &str) -> Option<&str> {
        self.data.old_input.get(field).map(String::as_str)
    }

    pub fn has_old_input(&self, field: &str) -> bool {
        self.data.old_input.contains_key(field)
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
