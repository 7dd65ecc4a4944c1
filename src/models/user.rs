//! Minimal user record, supplied by the host's session layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous user UUID (nil UUID).
pub const ANONYMOUS_USER_ID: Uuid = Uuid::nil();

/// The viewing user for a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub is_admin: bool,
}

impl User {
    /// Build an authenticated user.
    pub fn new(name: &str, is_admin: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.to_string(),
            is_admin,
        }
    }

    /// The anonymous user, used when a render has no session.
    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_USER_ID,
            name: "anonymous".to_string(),
            is_admin: false,
        }
    }

    /// Check if this is the anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }
}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}
