//! Item store trait.
//!
//! Every operation is scoped by owner id in the query itself, never as an
//! after-the-fact check. Mutations are atomic with respect to the backing
//! store: a failure mid-operation leaves no partial write visible.

use async_trait::async_trait;

use tasklane_core::{TodoChanges, TodoItem};

use crate::StorageResult;

/// CRUD over to-do items, scoped by owner.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts a new item for `owner_id` and returns it with its
    /// store-assigned id and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, owner_id: i64, title: &str, completed: bool)
    -> StorageResult<TodoItem>;

    /// Fetches one item by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// the item is absent or owned by someone else.
    async fn get_by_id(&self, owner_id: i64, id: i64) -> StorageResult<TodoItem>;

    /// Lists the owner's items, optionally filtered by completion flag.
    ///
    /// Ordering is not part of the contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self, owner_id: i64, completed: Option<bool>) -> StorageResult<Vec<TodoItem>>;

    /// Applies a partial update; only supplied fields change.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// the item is absent or owned by someone else.
    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: &TodoChanges,
    ) -> StorageResult<TodoItem>;

    /// Deletes one item.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// the item is absent or owned by someone else.
    async fn delete(&self, owner_id: i64, id: i64) -> StorageResult<()>;
}
