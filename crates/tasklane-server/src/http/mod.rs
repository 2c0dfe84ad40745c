//! HTTP boundary: request/response shapes and handlers.
//!
//! - `auth` - registration, sign-in, current identity
//! - `todos` - item CRUD
//! - `error` - API error responses

pub mod auth;
pub mod error;
pub mod todos;

pub use error::ApiError;
