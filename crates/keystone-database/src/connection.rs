//! Postgres pool for the account store.
//!
//! The URL is parsed before connecting; only host, port and database name
//! are ever logged.

use std::time::Duration;

use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use keystone_core::config::DatabaseConfig;
use keystone_core::error::{AppError, ErrorKind};

#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Parse `config.url` and open the pool, failing fast if the server is
    /// unreachable within `connect_timeout_seconds`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let target = connect_options(&config.url)?;

        info!(
            host = target.get_host(),
            port = target.get_port(),
            database = target.get_database().unwrap_or("-"),
            max_connections = config.max_connections,
            "Opening account database"
        );

        let pool = pool_options(config)
            .connect_with(target)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Account database unreachable", e)
            })?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips a ping on one pooled connection.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "No connection available", e)
        })?;

        match conn.ping().await {
            Ok(()) => Ok(true),
            Err(e) => {
                debug!(error = %e, "Database ping failed");
                Ok(false)
            }
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Account database closed");
    }
}

fn connect_options(url: &str) -> Result<PgConnectOptions, AppError> {
    url.parse::<PgConnectOptions>().map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid postgres URL",
            e,
        )
    })
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parts_are_extracted() {
        let options = connect_options("postgres://keystone:secret@db:6543/accounts").unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("accounts"));
    }

    #[test]
    fn test_bad_url_is_configuration_error() {
        let err = connect_options("mysql//nope").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_min_connections_never_exceed_max() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 10,
            ..DatabaseConfig::default()
        };
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 2);
        assert_eq!(options.get_min_connections(), 2);
    }
}
