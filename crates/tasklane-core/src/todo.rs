//! To-do item domain types.
//!
//! These are plain data-transfer shapes: the same structs are persisted to
//! the item store, serialized into cache entries, and returned over the API.
//! No live persistence-layer state is ever cached.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Maximum accepted title length, matching the column bound in the store.
pub const MAX_TITLE_LEN: usize = 100;

/// A single to-do item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Store-assigned numeric identifier.
    pub id: i64,

    /// Owning user id. Every store query filters on this.
    pub user_id: i64,

    /// Item title. Non-empty, at most [`MAX_TITLE_LEN`] characters.
    pub title: String,

    /// Completion flag.
    pub completed: bool,

    /// Server-assigned creation timestamp. Set once, never updated.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields a client supplies when creating an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoDraft {
    pub title: String,

    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: bool,
}

/// Partial update: only supplied fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoChanges {
    /// Returns `true` if no field is being changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Completion filter for list queries.
///
/// The filter is part of the list cache key, so the three variants below
/// enumerate the complete list-key space for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletedFilter {
    /// No filter: every item the user owns.
    Any,
    /// Only completed items.
    Completed,
    /// Only items still open.
    Active,
}

impl CompletedFilter {
    /// Builds a filter from the optional boolean carried by the API.
    #[must_use]
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Any,
            Some(true) => Self::Completed,
            Some(false) => Self::Active,
        }
    }

    /// The optional boolean the store query binds.
    #[must_use]
    pub fn flag(self) -> Option<bool> {
        match self {
            Self::Any => None,
            Self::Completed => Some(true),
            Self::Active => Some(false),
        }
    }

    /// Stable name used in cache keys and audit records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Completed => "completed",
            Self::Active => "active",
        }
    }
}

impl std::fmt::Display for CompletedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validation errors for item titles.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TitleError {
    /// The title is empty or whitespace-only.
    #[error("title must not be empty")]
    Empty,

    /// The title exceeds [`MAX_TITLE_LEN`] characters.
    #[error("title must be at most {MAX_TITLE_LEN} characters, got {len}")]
    TooLong {
        /// Actual character count.
        len: usize,
    },
}

/// Validates an item title against the store bounds.
///
/// # Errors
///
/// Returns [`TitleError`] if the title is empty or too long.
pub fn validate_title(title: &str) -> Result<(), TitleError> {
    if title.trim().is_empty() {
        return Err(TitleError::Empty);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(TitleError::TooLong { len });
    }
    Ok(())
}
