//! Authenticated identity and the store that persists it.

mod store;

pub use store::{SessionStore, TOKEN_KEY, USER_KEY};

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// Identity plus bearer token. The two only exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
    token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
