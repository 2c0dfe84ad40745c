//! Item CRUD handlers.
//!
//! The owner id always comes from the validated bearer token, never from
//! the request, so a caller can only ever touch their own items.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use tasklane_auth::BearerAuth;
use tasklane_core::{CompletedFilter, TodoChanges, TodoDraft, TodoItem, validate_title};

use crate::http::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub completed: Option<bool>,
}

/// `GET /todos`
pub async fn list_todos(
    State(state): State<AppState>,
    BearerAuth(user): BearerAuth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let filter = CompletedFilter::from_flag(params.completed);
    let items = state.todos.list(user.id, filter).await?;
    Ok(Json(items))
}

/// `GET /todos/{id}`
pub async fn get_todo(
    State(state): State<AppState>,
    BearerAuth(user): BearerAuth,
    Path(id): Path<i64>,
) -> Result<Json<TodoItem>, ApiError> {
    let item = state.todos.get(user.id, id).await?;
    Ok(Json(item))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    BearerAuth(user): BearerAuth,
    Json(draft): Json<TodoDraft>,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    validate_title(&draft.title)?;
    let item = state.todos.create(user.id, &draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /todos/{id}`
pub async fn update_todo(
    State(state): State<AppState>,
    BearerAuth(user): BearerAuth,
    Path(id): Path<i64>,
    Json(changes): Json<TodoChanges>,
) -> Result<Json<TodoItem>, ApiError> {
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    let item = state.todos.update(user.id, id, &changes).await?;
    Ok(Json(item))
}

/// `DELETE /todos/{id}`
pub async fn delete_todo(
    State(state): State<AppState>,
    BearerAuth(user): BearerAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.todos.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
