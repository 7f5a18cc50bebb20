//! `AuthUser` extractor: pulls the bearer token from the Authorization header
//! and resolves it to the current account.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use keystone_core::error::AppError;
use keystone_entity::account::Account;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated account behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Account);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let account = state.account_service.resolve_subject(token).await?;

        Ok(AuthUser(account))
    }
}
