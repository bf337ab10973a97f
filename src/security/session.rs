// Login sessions
//
// The cookie carries a random token. Sessions are keyed by the token's
// SHA-256 digest, never by the token itself.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::Principal;

pub const SESSION_COOKIE: &str = "TACOSESSION";

#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub created_at: DateTime<Utc>,
}

/// Shared, cloneable session table.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a session and return the token to hand to the client.
    pub fn create(&self, principal: Principal) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        let mut sessions = self.sessions.write();
        sessions.retain(|_, s| now - s.created_at < self.ttl);
        debug!(user = %principal.username, active = sessions.len() + 1, "session created");
        sessions.insert(
            digest(&token),
            Session {
                principal,
                created_at: now,
            },
        );

        token
    }

    pub fn get(&self, token: &str) -> Option<Principal> {
        self.get_at(token, Utc::now())
    }

    /// Look up a token as of `now`; expired sessions are dropped.
    pub fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<Principal> {
        let key = digest(token);
        {
            let sessions = self.sessions.read();
            match sessions.get(&key) {
                None => return None,
                Some(s) if now - s.created_at < self.ttl => return Some(s.principal.clone()),
                Some(_) => {}
            }
        }

        self.sessions.write().remove(&key);
        None
    }

    /// End a session. Returns whether it existed.
    pub fn remove(&self, token: &str) -> bool {
        self.sessions.write().remove(&digest(token)).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
