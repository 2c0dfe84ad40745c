//! Bearer token extraction and error responses.
//!
//! Provides the [`BearerAuth`] axum extractor: it pulls the token from
//! the `Authorization: Bearer <token>` header, validates it statelessly,
//! and hands the embedded user snapshot to the handler. No storage access
//! happens per request.
//!
//! # Example
//!
//! ```ignore
//! async fn me(BearerAuth(user): BearerAuth) -> Json<User> {
//!     Json(user)
//! }
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use tasklane_core::User;

use crate::error::AuthError;
use crate::token::TokenService;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token validation.
///
/// Include this in your application state and expose it to the extractor
/// via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token service for validating bearer tokens.
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates the bearer token and yields the
/// authenticated user snapshot.
pub struct BearerAuth(pub User);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::unauthorized("missing bearer token"))?;

        let user = auth_state.tokens.validate(token).inspect_err(|e| {
            tracing::debug!(error = %e, "token validation failed");
        })?;

        Ok(Self(user))
    }
}

// =============================================================================
// Error Responses
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = error_details(&self);

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Extracts response details from an `AuthError`.
///
/// Server-side errors deliberately collapse to a generic message: internal
/// detail goes to the logs, never over the wire.
fn error_details(error: &AuthError) -> (StatusCode, &'static str, String) {
    match error {
        AuthError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message.clone())
        }
        AuthError::InvalidToken { .. } => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "could not validate credentials".to_string(),
        ),
        AuthError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "token has expired".to_string(),
        ),
        AuthError::Conflict { message } => (StatusCode::CONFLICT, "conflict", message.clone()),
        AuthError::Storage { .. } | AuthError::Configuration { .. } | AuthError::Internal { .. } => {
            tracing::error!(error = %error, "internal error in auth path");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal server error".to_string(),
            )
        }
    }
}
