//! In-memory store implementations shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;

use tasklane_auth::{AuthError, AuthResult, UserRecord, UserStore};
use tasklane_core::{TodoChanges, TodoItem};
use tasklane_storage::{StorageError, StorageResult, TodoStore};

// =============================================================================
// MemoryTodoStore
// =============================================================================

#[derive(Default)]
struct MemoryTodos {
    items: HashMap<i64, TodoItem>,
    next_id: i64,
}

/// HashMap-backed item store with the same owner-scoping contract as the
/// PostgreSQL implementation.
#[derive(Default)]
pub struct MemoryTodoStore {
    inner: Mutex<MemoryTodos>,
}

impl MemoryTodoStore {
    /// Writes an item directly, bypassing the orchestrator and cache.
    /// Used to observe cache-hit behavior from the outside.
    pub fn insert_raw(&self, item: TodoItem) {
        let mut inner = self.inner.lock();
        inner.next_id = inner.next_id.max(item.id);
        inner.items.insert(item.id, item);
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(
        &self,
        owner_id: i64,
        title: &str,
        completed: bool,
    ) -> StorageResult<TodoItem> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let item = TodoItem {
            id: inner.next_id,
            user_id: owner_id,
            title: title.to_string(),
            completed,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_by_id(&self, owner_id: i64, id: i64) -> StorageResult<TodoItem> {
        self.inner
            .lock()
            .items
            .get(&id)
            .filter(|item| item.user_id == owner_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("todo", id))
    }

    async fn list(&self, owner_id: i64, completed: Option<bool>) -> StorageResult<Vec<TodoItem>> {
        Ok(self
            .inner
            .lock()
            .items
            .values()
            .filter(|item| item.user_id == owner_id)
            .filter(|item| completed.is_none_or(|flag| item.completed == flag))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: &TodoChanges,
    ) -> StorageResult<TodoItem> {
        let mut inner = self.inner.lock();
        let item = inner
            .items
            .get_mut(&id)
            .filter(|item| item.user_id == owner_id)
            .ok_or_else(|| StorageError::not_found("todo", id))?;

        if let Some(title) = &changes.title {
            item.title = title.clone();
        }
        if let Some(completed) = changes.completed {
            item.completed = completed;
        }
        Ok(item.clone())
    }

    async fn delete(&self, owner_id: i64, id: i64) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        let owned = inner
            .items
            .get(&id)
            .is_some_and(|item| item.user_id == owner_id);
        if !owned {
            return Err(StorageError::not_found("todo", id));
        }
        inner.items.remove(&id);
        Ok(())
    }
}

// =============================================================================
// MemoryUserStore
// =============================================================================

/// HashMap-backed user store enforcing the same uniqueness rules as the
/// PostgreSQL implementation.
#[derive(Default)]
pub struct MemoryUserStore {
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
            email: email.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
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
