//! To-do item storage.
//!
//! Every statement filters `user_id` in the WHERE clause, so an item
//! owned by someone else is indistinguishable from an absent one. Each
//! mutation is a single SQL statement and therefore atomic: a failure
//! leaves no partial write visible.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use tasklane_core::{TodoChanges, TodoItem};
use tasklane_storage::{StorageError, StorageResult, TodoStore};

use crate::PgPool;
use crate::error::storage_error;

/// Row shape of the `todo_items` relation.
type TodoTuple = (i64, i64, String, bool, OffsetDateTime);

fn item_from_tuple(row: TodoTuple) -> TodoItem {
    TodoItem {
        id: row.0,
        user_id: row.1,
        title: row.2,
        completed: row.3,
        created_at: row.4,
    }
}

/// Item storage operations backed by PostgreSQL.
#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    /// Creates a new item store with a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(
        &self,
        owner_id: i64,
        title: &str,
        completed: bool,
    ) -> StorageResult<TodoItem> {
        let row: TodoTuple = query_as(
            r#"
            INSERT INTO todo_items (user_id, title, completed)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, completed, created_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(completed)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(item_from_tuple(row))
    }

    async fn get_by_id(&self, owner_id: i64, id: i64) -> StorageResult<TodoItem> {
        let row: Option<TodoTuple> = query_as(
            r#"
            SELECT id, user_id, title, completed, created_at
            FROM todo_items
            WHERE user_id = $1
              AND id = $2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(item_from_tuple)
            .ok_or_else(|| StorageError::not_found("todo", id))
    }

    async fn list(&self, owner_id: i64, completed: Option<bool>) -> StorageResult<Vec<TodoItem>> {
        let rows: Vec<TodoTuple> = query_as(
            r#"
            SELECT id, user_id, title, completed, created_at
            FROM todo_items
            WHERE user_id = $1
              AND ($2::boolean IS NULL OR completed = $2)
            "#,
        )
        .bind(owner_id)
        .bind(completed)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(item_from_tuple).collect())
    }

    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: &TodoChanges,
    ) -> StorageResult<TodoItem> {
        let row: Option<TodoTuple> = query_as(
            r#"
            UPDATE todo_items
            SET title = COALESCE($3, title),
                completed = COALESCE($4, completed)
            WHERE user_id = $1
              AND id = $2
            RETURNING id, user_id, title, completed, created_at
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.completed)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(item_from_tuple)
            .ok_or_else(|| StorageError::not_found("todo", id))
    }

    async fn delete(&self, owner_id: i64, id: i64) -> StorageResult<()> {
        let result = query(
            r#"
            DELETE FROM todo_items
            WHERE user_id = $1
              AND id = $2
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("todo", id));
        }

        Ok(())
    }
}
