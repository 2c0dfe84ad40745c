//! Registration and sign-in flows.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::store::UserStore;
use crate::token::{SignedToken, TokenService};

/// Message returned for both unknown-username and wrong-password failures,
/// so a caller cannot probe which usernames exist.
const BAD_CREDENTIALS: &str = "incorrect username or password";

/// Composes the user store and the token service into the sign-up and
/// sign-in operations consumed by the API layer.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// The token service used for issuing and validating tokens.
    #[must_use]
    pub fn token_service(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Registers a new user and returns a token for the fresh account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the email or username is taken,
    /// [`AuthError::Internal`] if password hashing fails, or a storage
    /// error.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<SignedToken> {
        let password_hash = hash_password(password)
            .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;

        let record = self.users.create(email, username, &password_hash).await?;

        tracing::info!(user_id = record.id, username = %record.username, "user registered");
        self.tokens.issue(&record.public())
    }

    /// Verifies credentials and returns a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for an unknown username or a
    /// wrong password (indistinguishable by design), or a storage error.
    pub async fn sign_in(&self, username: &str, password: &str) -> AuthResult<SignedToken> {
        let Some(record) = self.users.find_by_username(username).await? else {
            tracing::debug!(username = %username, "sign-in failed: unknown username");
            return Err(AuthError::unauthorized(BAD_CREDENTIALS));
        };

        let matches = verify_password(password, &record.password_hash)
            .map_err(|e| AuthError::internal(format!("stored hash is malformed: {e}")))?;

        if !matches {
            tracing::debug!(user_id = record.id, "sign-in failed: wrong password");
            return Err(AuthError::unauthorized(BAD_CREDENTIALS));
        }

        self.tokens.issue(&record.public())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::store::UserRecord;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Minimal in-memory user store for exercising the service flows.
    #[derive(Default)]
    struct MemoryUserStore {
        users: Mutex<Vec<UserRecord>>,
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn create(
            &self,
            email: &str,
            username: &str,
            password_hash: &str,
        ) -> AuthResult<UserRecord> {
            let mut users = self.users.lock();
            if users.iter().any(|u| u.email == email) {
                return Err(AuthError::conflict("email already registered"));
            }
            if users.iter().any(|u| u.username == username) {
                return Err(AuthError::conflict("username already taken"));
            }
            let record = UserRecord {
                id: users.len() as i64 + 1,
                email: email.into(),
                username: username.into(),
                password_hash: password_hash.into(),
            };
            users.push(record.clone());
            Ok(record)
        }

        async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn find_by_id(&self, id: i64) -> AuthResult<Option<UserRecord>> {
            Ok(self.users.lock().iter().find(|u| u.id == id).cloned())
        }
    }

    fn auth_service() -> AuthService {
        let tokens = TokenService::new(&AuthConfig {
            secret: "0123456789abcdef0123456789abcdef".into(),
            ..Default::default()
        })
        .unwrap();
        AuthService::new(Arc::new(MemoryUserStore::default()), Arc::new(tokens))
    }

    #[tokio::test]
    async fn test_register_issues_token_for_new_user() {
        let service = auth_service();
        let token = service
            .register("ada@example.com", "ada", "hunter2hunter2")
            .await
            .unwrap();

        let user = service.token_service().validate(&token.access_token).unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = auth_service();
        service
            .register("ada@example.com", "ada", "pw-one-long-enough")
            .await
            .unwrap();

        let err = service
            .register("ada@example.com", "lovelace", "pw-two-long-enough")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_round_trip() {
        let service = auth_service();
        service
            .register("ada@example.com", "ada", "hunter2hunter2")
            .await
            .unwrap();

        let token = service.sign_in("ada", "hunter2hunter2").await.unwrap();
        let user = service.token_service().validate(&token.access_token).unwrap();
        assert_eq!(user.username, "ada");
    }

    #[tokio::test]
    async fn test_sign_in_failures_are_indistinguishable() {
        let service = auth_service();
        service
            .register("ada@example.com", "ada", "hunter2hunter2")
            .await
            .unwrap();

        let unknown = service.sign_in("nobody", "whatever").await.unwrap_err();
        let wrong = service.sign_in("ada", "wrong-password").await.unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
    }
}
