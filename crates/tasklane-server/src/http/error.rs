//! API error responses.
//!
//! Storage and validation failures map to user-visible statuses here;
//! internal detail stays in the logs. Auth errors carry their own
//! response mapping in `tasklane-auth`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use tasklane_auth::AuthError;
use tasklane_core::TitleError;
use tasklane_storage::StorageError;

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Authentication failure; delegates to the auth crate's response.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The item is absent or owned by someone else.
    #[error("not found")]
    NotFound,

    /// A unique identity field is taken.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The request body failed validation.
    #[error("unprocessable: {message}")]
    Unprocessable { message: String },

    /// Anything the client cannot act on.
    #[error("internal error")]
    Internal,
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::NotFound,
            StorageError::Conflict { message } => Self::Conflict { message },
            other => {
                tracing::error!(error = %other, category = %other.category(), "storage error");
                Self::Internal
            }
        }
    }
}

impl From<TitleError> for ApiError {
    fn from(err: TitleError) -> Self {
        Self::Unprocessable {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found", "not found".to_string()),
            ApiError::Conflict { message } => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Unprocessable { message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", message)
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal server error".to_string(),
            ),
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let err: ApiError = StorageError::not_found("todo", 3).into();
        assert!(matches!(err, ApiError::NotFound));

        let err: ApiError = StorageError::conflict("dup").into();
        assert!(matches!(err, ApiError::Conflict { .. }));

        let err: ApiError = StorageError::connection("down").into();
        assert!(matches!(err, ApiError::Internal));
    }

    #[test]
    fn test_title_error_maps_to_unprocessable() {
        let err: ApiError = TitleError::Empty.into();
        assert!(matches!(err, ApiError::Unprocessable { .. }));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err: ApiError = StorageError::internal("password for db is hunter2").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
