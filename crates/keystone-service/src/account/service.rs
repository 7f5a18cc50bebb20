//! Account service: registration, token subject resolution, and
//! password-change notification.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use keystone_auth::jwt::TokenIssuer;
use keystone_auth::password::PasswordHasher;
use keystone_core::error::{AppError, ErrorKind};
use keystone_core::events::{ActivationNotice, PasswordChangedNotice};
use keystone_core::traits::NotificationDispatcher;
use keystone_database::repositories::AccountRepository;
use keystone_entity::account::{Account, CreateAccount};

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Username to create.
    pub username: String,
    /// Address the activation notice goes to.
    pub email: String,
    /// Plaintext password; hashed before it reaches the repository.
    pub password: String,
}

/// Orchestrates account operations that span several collaborators.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuer>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenIssuer>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            dispatcher,
        }
    }

    /// Resolves a bearer token to the account it was issued for.
    ///
    /// Every failure, including a repository outage, is reported as
    /// `Authentication`.
    pub async fn resolve_subject(&self, token: &str) -> Result<Account, AppError> {
        let account_id = self.tokens.resolve(token)?;

        self.accounts.get_by_id(account_id).await.map_err(|e| {
            if !e.is(ErrorKind::NotFound) {
                warn!(account_id = %account_id, error = %e, "Subject lookup failed");
            }
            AppError::authentication("invalid token")
        })
    }

    /// Registers a new account and queues its activation notice.
    ///
    /// The notice is sent from a detached task; its failure is logged and
    /// never affects the already committed registration.
    pub async fn register(&self, registration: Registration) -> Result<Account, AppError> {
        let password_hash = self.hasher.hash(registration.password).await?;

        let account = self
            .accounts
            .create(&CreateAccount {
                username: registration.username,
                email: Some(registration.email.clone()),
                password_hash,
            })
            .await?;

        info!(account_id = %account.id, username = %account.username, "Account registered");

        let notice = ActivationNotice {
            account_id: account.id,
            username: account.username.clone(),
            email: registration.email,
            issued_at: account.created_at,
        };
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let account_id = notice.account_id;
            if let Err(e) = dispatcher.send_activation(notice).await {
                warn!(account_id = %account_id, error = %e, "Activation notice not dispatched");
            }
        });

        Ok(account)
    }

    /// Queues a password-changed notice for `account`. Returns immediately.
    pub fn notify_password_changed(&self, account: &Account) {
        let notice = PasswordChangedNotice {
            account_id: account.id,
            username: account.username.clone(),
            changed_at: Utc::now(),
        };
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let account_id = notice.account_id;
            if let Err(e) = dispatcher.send_password_changed(notice).await {
                warn!(account_id = %account_id, error = %e, "Password-changed notice not dispatched");
            }
        });
    }
}
