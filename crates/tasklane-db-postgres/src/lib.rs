//! PostgreSQL storage backend for Tasklane.
//!
//! Implements the `tasklane-auth` user store and the `tasklane-storage`
//! item store on top of `sqlx-postgres`, with embedded migrations for
//! single-binary deployment.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod todos;
pub mod users;

pub use config::PostgresConfig;
pub use error::PostgresError;
pub use pool::create_pool;
pub use todos::PgTodoStore;
pub use users::PgUserStore;

/// Re-export of the sqlx PostgreSQL pool type.
pub use sqlx_postgres::PgPool;
