//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default`, an optional `config/{env}` overlay, and `KEYSTONE_`
//! prefixed environment variables (`KEYSTONE_AUTH__JWT_SECRET`). Each
//! sub-module is one section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod notification;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, MAX_JWT_TTL_MINUTES};
pub use self::database::{DatabaseConfig, DatabaseDriver};
pub use self::logging::LoggingConfig;
pub use self::notification::{NotificationConfig, SinkKind};

use crate::error::AppError;

/// Environment variable prefix for overrides, e.g. `KEYSTONE_AUTH__JWT_SECRET`.
pub const ENV_PREFIX: &str = "KEYSTONE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Notification queue settings.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, `config/{env}`, and environment variables
    /// prefixed with `KEYSTONE_`, then validates the result.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    /// Deserialize and validate from an already assembled builder.
    pub fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config: Self = builder
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        if self.auth.jwt_ttl_minutes == 0 || self.auth.jwt_ttl_minutes > MAX_JWT_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "auth.jwt_ttl_minutes must be between 1 and {MAX_JWT_TTL_MINUTES}"
            )));
        }
        if self.auth.password_min_length > self.auth.password_max_length {
            return Err(AppError::configuration(
                "auth.password_min_length exceeds auth.password_max_length",
            ));
        }
        if self.database.driver == DatabaseDriver::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres driver",
            ));
        }
        if self.notification.enabled
            && self.notification.sink == SinkKind::Webhook
            && self.notification.webhook_url.is_empty()
        {
            return Err(AppError::configuration(
                "notification.webhook_url is required for the webhook sink",
            ));
        }
        Ok(())
    }
}
