//! Registration, sign-in and current-identity handlers.

use axum::{Json, extract::State};
use serde::Deserialize;

use tasklane_auth::{AuthError, BearerAuth, SignedToken};
use tasklane_core::User;

use crate::audit::{AuditAction, AuditEvent, AuditOutcome};
use crate::http::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// `POST /auth/sign-up`
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<SignedToken>, ApiError> {
    validate_sign_up(&req)?;

    match state.auth.register(&req.email, &req.username, &req.password).await {
        Ok(token) => {
            let owner = subject_of(&state, &token);
            let mut event = AuditEvent::new(AuditAction::UserRegister, AuditOutcome::Success);
            if let Some(owner) = owner {
                event = event.owner(owner);
            }
            state.audit.record(event).await;
            Ok(Json(token))
        }
        Err(e) => {
            state
                .audit
                .record(
                    AuditEvent::new(AuditAction::UserRegister, auth_outcome(&e))
                        .detail(e.to_string()),
                )
                .await;
            Err(e.into())
        }
    }
}

/// `POST /auth/sign-in`
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignedToken>, ApiError> {
    match state.auth.sign_in(&req.username, &req.password).await {
        Ok(token) => {
            let owner = subject_of(&state, &token);
            let mut event = AuditEvent::new(AuditAction::UserSignIn, AuditOutcome::Success);
            if let Some(owner) = owner {
                event = event.owner(owner);
            }
            state.audit.record(event).await;
            Ok(Json(token))
        }
        Err(e) => {
            state
                .audit
                .record(
                    AuditEvent::new(AuditAction::UserSignIn, auth_outcome(&e)).detail(e.to_string()),
                )
                .await;
            Err(e.into())
        }
    }
}

/// `GET /auth/user`
///
/// Returns the snapshot embedded in the token; no store round-trip.
pub async fn current_user(BearerAuth(user): BearerAuth) -> Json<User> {
    Json(user)
}

fn validate_sign_up(req: &SignUpRequest) -> Result<(), ApiError> {
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(ApiError::Unprocessable {
            message: "email must be a valid address".into(),
        });
    }
    if req.username.trim().is_empty() {
        return Err(ApiError::Unprocessable {
            message: "username must not be empty".into(),
        });
    }
    if req.password.is_empty() {
        return Err(ApiError::Unprocessable {
            message: "password must not be empty".into(),
        });
    }
    Ok(())
}

/// Recovers the subject id from a freshly issued token for audit records.
fn subject_of(state: &AppState, token: &SignedToken) -> Option<i64> {
    state
        .auth
        .token_service()
        .validate(&token.access_token)
        .map(|user| user.id)
        .ok()
}

fn auth_outcome(error: &AuthError) -> AuditOutcome {
    match error {
        AuthError::Conflict { .. } => AuditOutcome::Conflict,
        e if e.is_authentication_error() => AuditOutcome::Unauthorized,
        _ => AuditOutcome::Error,
    }
}
