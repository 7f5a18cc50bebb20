//! Self-service handlers for the authenticated account.

use axum::Json;
use axum::extract::State;
use tracing::info;

use keystone_core::error::AppError;

use crate::dto::request::{ChangePasswordRequest, UsernameRequest};
use crate::dto::response::{MessageResponse, UserEnvelope};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/user
pub async fn get_user(AuthUser(account): AuthUser) -> Json<UserEnvelope> {
    Json(account.into())
}

/// PATCH /api/user/username
pub async fn change_username(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    ValidatedJson(req): ValidatedJson<UsernameRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let updated = state
        .accounts
        .change_username(account.id, &req.username)
        .await?;

    info!(
        account_id = %account.id,
        from = %account.username,
        to = %updated.username,
        "Username changed"
    );

    Ok(Json(updated.into()))
}

/// PATCH /api/user/password
///
/// The current password must be re-proven; a mismatch is `Authorization`,
/// not `Authentication`, because the token itself was valid.
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let verified = state
        .password_hasher
        .verify(req.password, account.password_hash.clone())
        .await;
    if !verified {
        return Err(AppError::authorization("Current password is incorrect").into());
    }

    state.password_validator.validate(&req.new_password)?;

    let new_hash = state.password_hasher.hash(req.new_password).await?;
    state.accounts.change_password(account.id, &new_hash).await?;

    info!(account_id = %account.id, "Password changed");
    state.account_service.notify_password_changed(&account);

    Ok(Json(MessageResponse {
        message: "password changed".to_string(),
    }))
}
