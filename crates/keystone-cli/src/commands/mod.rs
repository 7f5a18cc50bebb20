//! CLI command definitions and dispatch.

pub mod account;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::output::{self, OutputFormat};
use keystone_core::config::{AppConfig, DatabaseDriver};
use keystone_core::error::AppError;
use keystone_database::provider::AccountStore;

/// Keystone: account identity service
#[derive(Debug, Parser)]
#[command(name = "keystone", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment; selects `config/{env}`
    #[arg(short, long, env = "KEYSTONE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Keystone server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Account administration
    Account(account::AccountArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Account(args) => account::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: open the configured account store
pub async fn open_store(config: &AppConfig) -> Result<AccountStore, AppError> {
    if config.database.driver == DatabaseDriver::Memory {
        output::print_warning("database.driver is 'memory'; changes will not be persisted");
    }
    AccountStore::open(&config.database).await
}
