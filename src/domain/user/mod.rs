//! User domain module.

use serde::Serialize;

use crate::domain::foundation::{Timestamp, UserId};

/// An anonymous user, created the first time a browser shows up without
/// a session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub created_at: Timestamp,
}

impl User {
    /// Creates a user with a freshly generated id.
    pub fn register() -> Self {
        Self {
            id: UserId::generate(),
            created_at: Timestamp::now(),
        }
    }
}
