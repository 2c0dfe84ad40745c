//! Authentication for the Tasklane server.
//!
//! Provides password hashing (Argon2id), a stateless JWT token service,
//! the user storage trait, and an axum bearer-token extractor. Tokens are
//! self-contained: validity is purely a function of signature and expiry,
//! with no server-side session or revocation state.

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthState, BearerAuth};
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use store::{UserRecord, UserStore};
pub use token::{SignedToken, TokenAlgorithm, TokenService};

/// Result type alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
