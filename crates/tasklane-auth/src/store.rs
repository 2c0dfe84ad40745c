//! User storage trait.
//!
//! Defines the interface for credential persistence. Implementations are
//! provided by storage backends (e.g. PostgreSQL).

use async_trait::async_trait;

use tasklane_core::User;

use crate::AuthResult;

/// A stored user account, including the password hash.
///
/// This shape never leaves the auth layer; the API and tokens only ever
/// see the [`User`] snapshot produced by [`UserRecord::public`].
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Store-assigned numeric identifier.
    pub id: i64,
    /// Unique email address.
    pub email: String,
    /// Unique username.
    pub username: String,
    /// PHC-formatted Argon2 hash. Opaque, never reversible.
    pub password_hash: String,
}

impl UserRecord {
    /// The public snapshot of this account.
    #[must_use]
    pub fn public(&self) -> User {
        User::new(self.id, self.email.clone(), self.username.clone())
    }
}

/// Storage operations for user accounts.
///
/// Accounts are immutable after registration; there is no update or
/// delete in this interface.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`](crate::AuthError::Conflict) if the
    /// email or username is already taken, or a storage error if the
    /// operation fails.
    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> AuthResult<UserRecord>;

    /// Finds a user by username.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>>;

    /// Finds a user by id.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: i64) -> AuthResult<Option<UserRecord>>;
}
