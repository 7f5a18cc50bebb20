//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use keystone_auth::jwt::TokenIssuer;
use keystone_auth::password::{PasswordHasher, PasswordValidator};
use keystone_core::config::AppConfig;
use keystone_core::result::AppResult;
use keystone_core::traits::NotificationDispatcher;
use keystone_database::provider::AccountStore;
use keystone_database::repositories::AccountRepository;
use keystone_service::account::AccountService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Account store (repository plus optional pool)
    pub store: AccountStore,
    /// Account repository
    pub accounts: Arc<dyn AccountRepository>,

    // ── Auth ─────────────────────────────────────────────────
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
    /// Password policy for new passwords
    pub password_validator: Arc<PasswordValidator>,
    /// Session token issuer
    pub tokens: Arc<TokenIssuer>,

    // ── Services ─────────────────────────────────────────────
    /// Account service
    pub account_service: Arc<AccountService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("password_hasher", &self.password_hasher)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl AppState {
    /// Wire every dependency from configuration, an opened store, and the
    /// notification dispatcher.
    pub fn new(
        config: AppConfig,
        store: AccountStore,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> AppResult<Self> {
        let accounts = Arc::clone(&store.repository);
        let password_hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let password_validator = Arc::new(PasswordValidator::new(&config.auth));
        let tokens = Arc::new(TokenIssuer::new(&config.auth));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            Arc::clone(&password_hasher),
            Arc::clone(&tokens),
            dispatcher,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            accounts,
            password_hasher,
            password_validator,
            tokens,
            account_service,
        })
    }
}
