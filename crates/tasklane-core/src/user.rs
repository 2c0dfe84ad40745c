//! Public user identity snapshot.
//!
//! This is the shape embedded in tokens and returned by the API. The
//! password hash never appears here; credential records live in the auth
//! storage layer.

use serde::{Deserialize, Serialize};

/// Public fields of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned numeric identifier.
    pub id: i64,

    /// Unique email address.
    pub email: String,

    /// Unique username used for sign-in.
    pub username: String,
}

impl User {
    /// Creates a new user snapshot.
    #[must_use]
    pub fn new(id: i64, email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            username: username.into(),
        }
    }
}
