//! Read-through / write-invalidate cache layer.
//!
//! - `backend` - the remote key-value store with a local fallback queue
//! - `keys` - deterministic cache key derivation

pub mod backend;
pub mod keys;

pub use backend::{RemoteCache, SetOutcome};
