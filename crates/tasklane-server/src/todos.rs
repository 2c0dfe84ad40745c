//! The to-do orchestrator: cache in front of the item store, with an
//! audit event on every branch.
//!
//! The store is the system of record; the cache only shortens reads and
//! may be empty or behind at any moment. Reads go through the cache,
//! mutations go to the store first and then drop every list-shaped key
//! the owner has — not just the filter a request happened to use, since
//! the mutated item may newly match a filter outside this operation's
//! context. Absence is never cached: a `NotFound` today may be a hit
//! tomorrow.

use std::sync::Arc;
use std::time::Duration;

use tasklane_core::{CompletedFilter, TodoChanges, TodoDraft, TodoItem};
use tasklane_storage::{StorageError, StorageResult, TodoStore};

use crate::audit::{AuditAction, AuditEvent, AuditLogger, AuditOutcome};
use crate::cache::{RemoteCache, keys};

/// Composes the cache layer, the item store and the audit logger into
/// the CRUD contract the HTTP boundary consumes.
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    cache: RemoteCache,
    audit: Arc<AuditLogger>,
    cache_ttl: Duration,
}

impl TodoService {
    /// Creates a new orchestrator.
    ///
    /// `cache_ttl` applies to every entry this service writes; the cache
    /// itself has no default.
    pub fn new(
        store: Arc<dyn TodoStore>,
        cache: RemoteCache,
        audit: Arc<AuditLogger>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            audit,
            cache_ttl,
        }
    }

    /// Fetches one item: cache hit, or store read that populates the
    /// single-item key.
    pub async fn get(&self, owner_id: i64, id: i64) -> StorageResult<TodoItem> {
        let key = keys::todo_key(owner_id, id);

        if let Some(item) = self.cache.get_json::<TodoItem>(&key).await {
            self.audit
                .record(
                    AuditEvent::new(AuditAction::TodoGet, AuditOutcome::CacheHit)
                        .owner(owner_id)
                        .todo(id),
                )
                .await;
            return Ok(item);
        }

        match self.store.get_by_id(owner_id, id).await {
            Ok(item) => {
                self.cache.set_json(&key, &item, self.cache_ttl).await;
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::TodoGet, AuditOutcome::Success)
                            .owner(owner_id)
                            .todo(id),
                    )
                    .await;
                Ok(item)
            }
            Err(e) => {
                self.record_failure(AuditAction::TodoGet, owner_id, Some(id), &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Lists items under a completion filter; the filter is part of the
    /// cache key.
    pub async fn list(
        &self,
        owner_id: i64,
        filter: CompletedFilter,
    ) -> StorageResult<Vec<TodoItem>> {
        let key = keys::todo_list_key(owner_id, filter);

        if let Some(items) = self.cache.get_json::<Vec<TodoItem>>(&key).await {
            self.audit
                .record(
                    AuditEvent::new(AuditAction::TodoList, AuditOutcome::CacheHit)
                        .owner(owner_id)
                        .filter(filter.as_str())
                        .count(items.len()),
                )
                .await;
            return Ok(items);
        }

        match self.store.list(owner_id, filter.flag()).await {
            Ok(items) => {
                self.cache.set_json(&key, &items, self.cache_ttl).await;
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::TodoList, AuditOutcome::Success)
                            .owner(owner_id)
                            .filter(filter.as_str())
                            .count(items.len()),
                    )
                    .await;
                Ok(items)
            }
            Err(e) => {
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::TodoList, AuditOutcome::Error)
                            .owner(owner_id)
                            .filter(filter.as_str())
                            .detail(e.to_string()),
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Creates an item. The store commit happens before any cache work;
    /// there is no single-item key to populate yet because the id is
    /// store-assigned.
    pub async fn create(&self, owner_id: i64, draft: &TodoDraft) -> StorageResult<TodoItem> {
        match self
            .store
            .create(owner_id, &draft.title, draft.completed)
            .await
        {
            Ok(item) => {
                self.invalidate_lists(owner_id).await;
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::TodoCreate, AuditOutcome::Success)
                            .owner(owner_id)
                            .todo(item.id),
                    )
                    .await;
                Ok(item)
            }
            Err(e) => {
                self.record_failure(AuditAction::TodoCreate, owner_id, None, &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Applies a partial update, refreshes the single-item key with the
    /// new value, and drops the owner's list keys.
    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: &TodoChanges,
    ) -> StorageResult<TodoItem> {
        // Baseline fetch straight from the store: fail early on a missing
        // item without consulting a possibly stale cache entry.
        if let Err(e) = self.store.get_by_id(owner_id, id).await {
            self.record_failure(AuditAction::TodoUpdate, owner_id, Some(id), &e)
                .await;
            return Err(e);
        }

        match self.store.update(owner_id, id, changes).await {
            Ok(item) => {
                self.cache
                    .set_json(&keys::todo_key(owner_id, id), &item, self.cache_ttl)
                    .await;
                self.invalidate_lists(owner_id).await;
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::TodoUpdate, AuditOutcome::Success)
                            .owner(owner_id)
                            .todo(id),
                    )
                    .await;
                Ok(item)
            }
            Err(e) => {
                self.record_failure(AuditAction::TodoUpdate, owner_id, Some(id), &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Deletes an item, evicts its key and drops the owner's list keys.
    pub async fn delete(&self, owner_id: i64, id: i64) -> StorageResult<()> {
        if let Err(e) = self.store.get_by_id(owner_id, id).await {
            self.record_failure(AuditAction::TodoDelete, owner_id, Some(id), &e)
                .await;
            return Err(e);
        }

        match self.store.delete(owner_id, id).await {
            Ok(()) => {
                let [any, completed, active] = keys::all_todo_list_keys(owner_id);
                self.cache
                    .delete(&[keys::todo_key(owner_id, id), any, completed, active])
                    .await;
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::TodoDelete, AuditOutcome::Success)
                            .owner(owner_id)
                            .todo(id),
                    )
                    .await;
                Ok(())
            }
            Err(e) => {
                self.record_failure(AuditAction::TodoDelete, owner_id, Some(id), &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Drops every list-shaped key the owner has.
    async fn invalidate_lists(&self, owner_id: i64) {
        self.cache.delete(&keys::all_todo_list_keys(owner_id)).await;
    }

    async fn record_failure(
        &self,
        action: AuditAction,
        owner_id: i64,
        todo_id: Option<i64>,
        error: &StorageError,
    ) {
        let outcome = if error.is_not_found() {
            AuditOutcome::NotFound
        } else {
            AuditOutcome::Error
        };

        let mut event = AuditEvent::new(action, outcome).owner(owner_id);
        if let Some(id) = todo_id {
            event = event.todo(id);
        }
        if !error.is_not_found() {
            event = event.detail(error.to_string());
        }

        self.audit.record(event).await;
    }
}
