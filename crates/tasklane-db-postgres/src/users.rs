//! User account storage.
//!
//! Implements the `tasklane-auth` user store on the `users` relation.
//! Uniqueness of email and username is enforced by the database; unique
//! violations surface as conflict errors with the offending field named.

use async_trait::async_trait;
use sqlx_core::query_as::query_as;

use tasklane_auth::{AuthError, AuthResult, UserRecord, UserStore};

use crate::PgPool;
use crate::error::auth_error;

/// Row shape of the `users` relation.
type UserTuple = (i64, String, String, String);

fn record_from_tuple(row: UserTuple) -> UserRecord {
    UserRecord {
        id: row.0,
        email: row.1,
        username: row.2,
        password_hash: row.3,
    }
}

/// User storage operations backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a new user store with a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> AuthResult<UserRecord> {
        let row: UserTuple = query_as(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::error::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                let message = match db_err.constraint() {
                    Some("users_email_key") => "email already registered",
                    Some("users_username_key") => "username already taken",
                    _ => "email or username already taken",
                };
                return AuthError::conflict(message);
            }
            auth_error(e)
        })?;

        Ok(record_from_tuple(row))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, email, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(auth_error)?;

        Ok(row.map(record_from_tuple))
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<UserRecord>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, email, username, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(auth_error)?;

        Ok(row.map(record_from_tuple))
    }
}
