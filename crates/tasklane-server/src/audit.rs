//! Audit trail for cache and storage outcomes.
//!
//! Every orchestrated operation emits exactly one event per branch
//! (hit, miss, success, error). Each event is appended to two sinks: a
//! local JSON-lines log file and a bounded most-recent-first ring in the
//! cache backing store (buffered locally while that store is down).
//! Sink failures are reported through `tracing` and never interrupt the
//! operation that produced the event.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::cache::RemoteCache;

/// Redis list key of the recent-events ring.
pub const RECENT_EVENTS_KEY: &str = "tasklane:audit:recent";

/// Audited operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserRegister,
    UserSignIn,
    TodoGet,
    TodoList,
    TodoCreate,
    TodoUpdate,
    TodoDelete,
}

impl AuditAction {
    /// Returns a stable name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserSignIn => "user_sign_in",
            AuditAction::TodoGet => "todo_get",
            AuditAction::TodoList => "todo_list",
            AuditAction::TodoCreate => "todo_create",
            AuditAction::TodoUpdate => "todo_update",
            AuditAction::TodoDelete => "todo_delete",
        }
    }

    /// The resource kind the action touches.
    pub fn resource(&self) -> &'static str {
        match self {
            AuditAction::UserRegister | AuditAction::UserSignIn => "user",
            AuditAction::TodoList => "todos",
            _ => "todo",
        }
    }
}

/// How an audited operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Served from the system of record.
    Success,
    /// Served from the cache.
    CacheHit,
    /// Target absent or owned by someone else.
    NotFound,
    /// Credentials rejected.
    Unauthorized,
    /// Duplicate identity field.
    Conflict,
    /// Unexpected failure; detail carries the error.
    Error,
}

impl AuditOutcome {
    /// Returns a stable name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::CacheHit => "cache_hit",
            AuditOutcome::NotFound => "not_found",
            AuditOutcome::Unauthorized => "unauthorized",
            AuditOutcome::Conflict => "conflict",
            AuditOutcome::Error => "error",
        }
    }
}

/// One structured audit record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub action: AuditAction,
    pub resource: &'static str,
    pub outcome: AuditOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Creates a new event stamped with the current time.
    #[must_use]
    pub fn new(action: AuditAction, outcome: AuditOutcome) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            action,
            resource: action.resource(),
            outcome,
            owner_id: None,
            todo_id: None,
            filter: None,
            count: None,
            detail: None,
        }
    }

    /// Sets the owning user id.
    #[must_use]
    pub fn owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Sets the item id involved.
    #[must_use]
    pub fn todo(mut self, todo_id: i64) -> Self {
        self.todo_id = Some(todo_id);
        self
    }

    /// Sets the list filter involved.
    #[must_use]
    pub fn filter(mut self, filter: &'static str) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the result count of a list operation.
    #[must_use]
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches error or context detail.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Append-only event sink with two destinations.
pub struct AuditLogger {
    file: Mutex<File>,
    cache: RemoteCache,
    recent_capacity: usize,
}

impl AuditLogger {
    /// Opens (creating if needed) the local append log and wires the
    /// recent-events ring into the given cache backend.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the log file cannot be opened.
    pub fn new(
        log_path: &Path,
        cache: RemoteCache,
        recent_capacity: usize,
    ) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(log_path)?;

        Ok(Self {
            file: Mutex::new(file),
            cache,
            recent_capacity,
        })
    }

    /// Records one event in both sinks.
    ///
    /// Failures are caught and reported through `tracing::error!`; this
    /// never fails the calling operation.
    pub async fn record(&self, event: AuditEvent) {
        let line = match serde_json::to_vec(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize audit event");
                return;
            }
        };

        self.append_to_file(&line);

        self.cache
            .push_recent(RECENT_EVENTS_KEY, line, self.recent_capacity)
            .await;

        tracing::debug!(
            action = event.action.as_str(),
            outcome = event.outcome.as_str(),
            owner_id = event.owner_id,
            "audit event recorded"
        );
    }

    fn append_to_file(&self, line: &[u8]) {
        let mut file = self.file.lock();
        let result = file
            .write_all(line)
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.flush());

        if let Err(e) = result {
            tracing::error!(error = %e, "audit file append failed");
        }
    }
}
