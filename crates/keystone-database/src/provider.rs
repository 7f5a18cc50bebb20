//! Account store selection by configured driver.

use std::sync::Arc;

use tracing::info;

use keystone_core::config::{DatabaseConfig, DatabaseDriver};
use keystone_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;
use crate::repositories::{AccountRepository, MemoryAccountRepository, PgAccountRepository};

/// The account repository in use plus the pool behind it, if any.
#[derive(Clone)]
pub struct AccountStore {
    /// Repository handed to services and handlers.
    pub repository: Arc<dyn AccountRepository>,
    /// Present for the postgres driver.
    pub pool: Option<DatabasePool>,
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("pool", &self.pool)
            .finish()
    }
}

impl AccountStore {
    /// Open the store described by `config`, migrating if configured to.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.driver {
            DatabaseDriver::Memory => {
                info!("Using in-memory account store; data is lost on restart");
                Ok(Self::memory())
            }
            DatabaseDriver::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.auto_migrate {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self {
                    repository: Arc::new(PgAccountRepository::new(pool.pool().clone())),
                    pool: Some(pool),
                })
            }
        }
    }

    /// A fresh in-memory store.
    pub fn memory() -> Self {
        Self {
            repository: Arc::new(MemoryAccountRepository::new()),
            pool: None,
        }
    }

    /// Check the backing database, if there is one.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release pooled connections.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_driver_needs_no_database() {
        let config = DatabaseConfig {
            driver: DatabaseDriver::Memory,
            ..DatabaseConfig::default()
        };

        let store = AccountStore::open(&config).await.unwrap();
        assert!(store.pool.is_none());
        assert!(store.health_check().await.unwrap());
    }
}
