//! Account administration CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use keystone_api::dto::response::AccountResponse;
use keystone_core::error::AppError;
use keystone_database::repositories::AccountRepository;
use keystone_entity::account::{Account, Feature};

/// Arguments for account commands
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account subcommand
    #[command(subcommand)]
    pub command: AccountCommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Show one account
    Show {
        /// Username
        username: String,
    },
    /// Manage feature flags
    Feature {
        /// Feature subcommand
        #[command(subcommand)]
        command: FeatureCommand,
    },
}

/// Feature flag subcommands
#[derive(Debug, Subcommand)]
pub enum FeatureCommand {
    /// Attach a feature flag to an account
    Add {
        /// Username
        username: String,
        /// Feature name
        feature: String,
    },
    /// Detach a feature flag from an account
    Remove {
        /// Username
        username: String,
        /// Feature name
        feature: String,
    },
}

/// Account display row for table output
#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    /// Account ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Feature flags
    features: String,
    /// Ban expiry
    banned_until: String,
    /// Last login
    last_login_at: String,
    /// Created at
    created_at: String,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone().unwrap_or_default(),
            features: account.features.join(", "),
            banned_until: account
                .banned_until
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
            last_login_at: account
                .last_login_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Whether a feature command attaches or detaches the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureChange {
    Add,
    Remove,
}

/// Execute account commands
pub async fn execute(args: &AccountArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let store = super::open_store(&config).await?;
    let repo = store.repository.as_ref();

    let result = match &args.command {
        AccountCommand::Show { username } => {
            let account = repo.get_by_username(username).await?;
            print_account(&account, format);
            Ok(())
        }
        AccountCommand::Feature { command } => {
            let (change, username, feature) = match command {
                FeatureCommand::Add { username, feature } => (FeatureChange::Add, username, feature),
                FeatureCommand::Remove { username, feature } => {
                    (FeatureChange::Remove, username, feature)
                }
            };
            let feature: Feature = feature.parse()?;
            let account = apply_feature(repo, username, &feature, change).await?;

            let verb = match change {
                FeatureChange::Add => "attached to",
                FeatureChange::Remove => "detached from",
            };
            output::print_success(&format!("Feature '{feature}' {verb} '{}'", account.username));
            print_account(&account, format);
            Ok(())
        }
    };

    store.close().await;
    result
}

/// Attach or detach `feature` on the account named `username` and return
/// the account as stored afterwards.
pub async fn apply_feature(
    repo: &dyn AccountRepository,
    username: &str,
    feature: &Feature,
    change: FeatureChange,
) -> Result<Account, AppError> {
    let account = repo.get_by_username(username).await?;

    match change {
        FeatureChange::Add => repo.add_feature(account.id, feature).await?,
        FeatureChange::Remove => repo.remove_feature(account.id, feature).await?,
    }

    repo.get_by_id(account.id).await
}

fn print_account(account: &Account, format: OutputFormat) {
    let row = AccountRow::from(account);
    let snapshot = AccountResponse::from(account.clone());
    output::print_record(row, &snapshot, format);
}
