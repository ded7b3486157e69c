use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::api::admins::{ACCOUNT_DEACTIVATED, ADMIN_NOT_FOUND};
use crate::auth::models::{AuthenticatedAdmin, Capability};
use crate::error::AppError;
use crate::state::AppState;

pub const MISSING_TOKEN: &str = "No token provided. Please login first";
pub const SUPER_ADMIN_ONLY: &str = "Access denied. Only super_admin can perform this action";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Any active administrator holding a valid bearer token.
///
/// The account is re-read on every request, so deactivation and role
/// changes apply to tokens issued earlier.
impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let Some(token) = bearer_token(&parts.headers) else {
            tracing::debug!(path = %parts.uri.path(), "request without bearer token");
            return Err(AppError::Auth(MISSING_TOKEN.into()));
        };

        let claimed = state.tokens.verify(token).map_err(|reason| {
            tracing::warn!(?reason, path = %parts.uri.path(), "rejected bearer token");
            AppError::from(reason)
        })?;

        let Some(admin) = state.admin_repo.find_by_id(claimed.id).await? else {
            tracing::warn!(admin_id = %claimed.id, "token for a missing admin");
            return Err(AppError::NotFound(ADMIN_NOT_FOUND.into()));
        };
        if !admin.is_active {
            tracing::warn!(admin_id = %admin.id, "token for a deactivated admin");
            return Err(AppError::Forbidden(ACCOUNT_DEACTIVATED.into()));
        }

        Ok(AuthenticatedAdmin {
            id: admin.id,
            email: admin.email,
            role: admin.role,
        })
    }
}

/// An administrator allowed to manage other administrators.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub AuthenticatedAdmin);

impl<S> FromRequestParts<S> for SuperAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let admin = AuthenticatedAdmin::from_request_parts(parts, state).await?;
        if !admin.can(Capability::ManageAdmins) {
            tracing::warn!(admin_id = %admin.id, role = %admin.role, "super admin route refused");
            return Err(AppError::Forbidden(SUPER_ADMIN_ONLY.into()));
        }
        Ok(SuperAdmin(admin))
    }
}
