//! Identity extraction from gateway-forwarded headers.
//!
//! Authentication happens upstream. The gateway forwards the verified user as
//! `x-user-id` and `x-user-email`; this module turns those headers into an
//! `AuthUser` and derives the admin role from the configured allow-list.

use axum::extract::FromRef;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::services::auth::AdminConfig;
use crate::state::AppState;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";
pub(crate) const USER_EMAIL_HEADER: &str = "x-user-email";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user forwarded by the gateway.
/// Use as a handler parameter to require authentication.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// Guard extractor: the caller holds the admin role. Rejects with 403 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

pub(crate) fn identity_from_headers(headers: &HeaderMap, admins: &AdminConfig) -> Result<AuthUser, StatusCode> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let email = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_owned);
    let is_admin = email.as_deref().is_some_and(|e| admins.is_admin(e));

    Ok(AuthUser { user_id, email, is_admin })
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        identity_from_headers(&parts.headers, &app_state.admins)
    }
}

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(Self)
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/auth/me`: the caller's identity and role.
pub async fn me(auth: AuthUser) -> Json<AuthUser> {
    Json(auth)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
