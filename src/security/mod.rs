//! Authentication and access control.
//!
//! - [`policy`]: ordered path rules, first match wins
//! - [`session`]: in-memory login sessions behind an opaque cookie token
//! - [`password`]: bcrypt hashing and verification

pub mod password;
pub mod policy;
pub mod session;

pub use password::{hash_password, verify_password};
pub use policy::{AccessPolicy, AccessRule, Decision, PathMatcher, Requirement};
pub use session::{Session, SessionStore, SESSION_COOKIE};

use serde::Serialize;

use crate::entities::User;

/// An authenticated user as seen by the access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(username: &str, roles: &[&str]) -> Self {
        Principal {
            username: username.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            username: user.username.clone(),
            roles: vec![user.role.clone()],
        }
    }
}

/// Check a login attempt against a stored user.
///
/// Blocks for the duration of a bcrypt verification; call off the executor.
pub fn check_credentials(user: &User, password: &str) -> Option<Principal> {
    if verify_password(password, &user.password_hash) {
        Some(Principal::from(user))
    } else {
        None
    }
}
