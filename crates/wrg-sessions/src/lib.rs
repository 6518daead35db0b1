//! Session records under the `user:` key namespace.
//!
//! A session maps an opaque id to a name and role for *attribution* only;
//! no authorization is derived from it and none expires server-side. The
//! bearer-credential check in front of the HTTP surface is a separate,
//! pass-through boundary.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use wrg_schemas::{Role, Session};
use wrg_store::{KvStore, StoreError};

/// Key prefix for session records.
pub const SESSION_KEY_PREFIX: &str = "user:";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SessionError {
    /// The login request is missing a usable name.
    Validation(String),
    /// No session exists for the given id.
    NotFound(String),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Validation(msg) => write!(f, "invalid login: {msg}"),
            SessionError::NotFound(id) => write!(f, "session not found: {id}"),
            SessionError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Owns the `user:` namespace. One instance per process, shared by handle.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Issue a fresh session for the given identity and persist it.
    pub async fn login(&self, name: &str, role: Role) -> Result<Session, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::Validation("name is required".into()));
        }

        let session = Session {
            session_id: format!("session_{}", Uuid::new_v4()),
            name: name.to_string(),
            role,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&session)
            .map_err(|e| StoreError::Codec(e.to_string()))?;
        self.store
            .set(&session_key(&session.session_id), value)
            .await?;

        info!(session_id = %session.session_id, role = %role, "session issued");
        Ok(session)
    }

    /// Resolve a session id to its identity. Sessions never expire.
    pub async fn lookup(&self, session_id: &str) -> Result<Session, SessionError> {
        match self.store.get(&session_key(session_id)).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| SessionError::Store(StoreError::Codec(e.to_string()))),
            None => Err(SessionError::NotFound(session_id.to_string())),
        }
    }
}

fn session_key(session_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{session_id}")
}
