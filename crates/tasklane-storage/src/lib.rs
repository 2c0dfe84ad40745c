//! Storage abstraction for the Tasklane item store.
//!
//! Defines the [`TodoStore`] trait and the [`StorageError`] taxonomy.
//! Implementations live in backend crates (e.g. `tasklane-db-postgres`).

pub mod error;
pub mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::TodoStore;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
