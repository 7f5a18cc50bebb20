//! Auth handlers: login and registration.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{debug, info, warn};

use keystone_core::error::{AppError, ErrorKind};
use keystone_service::account::Registration;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{TokenResponse, UserEnvelope};
use crate::error::ApiError;
use crate::extractors::{ClientAddr, ValidatedJson};
use crate::state::AppState;

/// POST /auth/login
///
/// Unknown usernames and wrong passwords produce the same response. The ban
/// check runs only after the password has been verified. Email-shaped
/// usernames are matched the way registration stored them.
pub async fn login(
    State(state): State<AppState>,
    ClientAddr(client_addr): ClientAddr,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let username = login_name(&req.username);
    let account = match state.accounts.get_by_username(&username).await {
        Ok(account) => account,
        Err(e) if e.is(ErrorKind::NotFound) => {
            state.password_hasher.verify_decoy(req.password).await;
            debug!("Login for unknown username");
            return Err(AppError::invalid_credentials().into());
        }
        Err(e) => return Err(e.into()),
    };

    let verified = state
        .password_hasher
        .verify(req.password, account.password_hash.clone())
        .await;
    if !verified {
        debug!(account_id = %account.id, "Login with wrong password");
        return Err(AppError::invalid_credentials().into());
    }

    if account.is_banned() {
        info!(account_id = %account.id, "Login refused for banned account");
        return Err(AppError::account_banned(account.ban_reason.as_deref()).into());
    }

    if let Err(e) = state
        .accounts
        .update_last_login(account.id, client_addr.as_deref())
        .await
    {
        warn!(account_id = %account.id, error = %e, "Failed to record last login");
    }

    let token = state.tokens.issue(account.id)?;
    info!(account_id = %account.id, "Login succeeded");

    Ok(Json(TokenResponse { token }))
}

/// POST /auth/register
///
/// The username is the email address, trimmed and lowercased. No token is
/// issued; the activation notice is queued by the account service.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    state.password_validator.validate(&req.password)?;

    let email = normalize_email(&req.email);
    let account = state
        .account_service
        .register(Registration {
            username: email.clone(),
            email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registered accounts are keyed by their normalized email. Renamed
/// usernames cannot contain `@`, so anything else is looked up verbatim.
fn login_name(username: &str) -> String {
    if username.contains('@') {
        normalize_email(username)
    } else {
        username.to_string()
    }
}
