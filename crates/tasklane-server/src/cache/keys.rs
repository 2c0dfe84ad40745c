//! Deterministic cache key derivation.
//!
//! Keys are built from (owner id, resource kind, optional item id,
//! optional filter). A list entry is only valid for the exact filter
//! encoded in its key, so the three list variants below are treated as
//! one unit for invalidation: any mutation to any of the owner's items
//! drops all of them, since the mutated item may newly match a filter
//! that was not part of the operation's context.

use tasklane_core::CompletedFilter;

/// Key for a single cached item.
#[must_use]
pub fn todo_key(user_id: i64, todo_id: i64) -> String {
    format!("user:{user_id}:todo:{todo_id}")
}

/// Key for a cached list under a specific completion filter.
#[must_use]
pub fn todo_list_key(user_id: i64, filter: CompletedFilter) -> String {
    match filter {
        CompletedFilter::Any => format!("user:{user_id}:todos"),
        CompletedFilter::Completed => format!("user:{user_id}:todos:completed"),
        CompletedFilter::Active => format!("user:{user_id}:todos:active"),
    }
}

/// Every list-shaped key for one owner. This is the complete set to
/// invalidate on any mutation.
#[must_use]
pub fn all_todo_list_keys(user_id: i64) -> [String; 3] {
    [
        todo_list_key(user_id, CompletedFilter::Any),
        todo_list_key(user_id, CompletedFilter::Completed),
        todo_list_key(user_id, CompletedFilter::Active),
    ]
}
