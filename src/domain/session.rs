//! Login sessions with expiry.
//!
//! [`SessionStore`] keeps issued session tokens in a `HashMap` behind a
//! [`tokio::sync::RwLock`]. Each token carries its own expiry; expired
//! tokens are rejected and dropped on lookup.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store of active login sessions.
#[derive(Debug)]
pub struct SessionStore {
    ttl: TimeDelta,
    sessions: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

/// A freshly issued session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedSession {
    /// Opaque session token.
    pub token: Uuid,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl SessionStore {
    /// Creates an empty store whose sessions live for `ttl`.
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a new session token.
    pub async fn create(&self) -> IssuedSession {
        self.create_at(Utc::now()).await
    }

    async fn create_at(&self, now: DateTime<Utc>) -> IssuedSession {
        let token = Uuid::new_v4();
        let expires_at = now + self.ttl;
        self.sessions.write().await.insert(token, expires_at);
        IssuedSession { token, expires_at }
    }

    /// Returns `true` if `token` exists and has not expired.
    pub async fn is_valid(&self, token: Uuid) -> bool {
        self.is_valid_at(token, Utc::now()).await
    }

    async fn is_valid_at(&self, token: Uuid, now: DateTime<Utc>) -> bool {
        let expires_at = self.sessions.read().await.get(&token).copied();
        match expires_at {
            Some(expires_at) if expires_at > now => true,
            Some(_) => {
                self.sessions.write().await.remove(&token);
                false
            }
            None => false,
        }
    }

    /// Revokes `token`. Returns `true` if it was present.
    pub async fn revoke(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut map = self.sessions.write().await;
        let before = map.len();
        map.retain(|_, expires_at| *expires_at > now);
        before - map.len()
    }

    /// Number of stored sessions, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
