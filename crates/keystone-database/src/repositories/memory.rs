//! In-process account repository.
//!
//! Used by the `memory` database driver and by tests. Both indexes are
//! updated under one write lock, so uniqueness checks and inserts are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::account::{Account, CreateAccount, Feature};

use super::AccountRepository;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    by_username: HashMap<String, Uuid>,
}

impl Tables {
    fn get_mut(&mut self, id: Uuid) -> AppResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    fn email_taken(&self, email: &str) -> bool {
        self.accounts
            .values()
            .any(|a| a.email.as_deref() == Some(email))
    }
}

/// Account repository held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    tables: RwLock<Tables>,
}

impl MemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed account, bypassing registration.
    ///
    /// Useful for fixtures that need ban state or feature flags preset.
    pub async fn seed(&self, account: Account) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.by_username.contains_key(&account.username) {
            return Err(AppError::conflict("Username is already taken"));
        }
        tables.by_username.insert(account.username.clone(), account.id);
        tables.accounts.insert(account.id, account);
        Ok(())
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.tables.read().await.accounts.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn get_by_username(&self, username: &str) -> AppResult<Account> {
        let tables = self.tables.read().await;
        tables
            .by_username
            .get(username)
            .and_then(|id| tables.accounts.get(id))
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Account '{username}' not found")))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Account> {
        self.tables
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        let mut tables = self.tables.write().await;

        if tables.by_username.contains_key(&data.username) {
            return Err(AppError::conflict("Username is already taken"));
        }
        if let Some(email) = data.email.as_deref() {
            if tables.email_taken(email) {
                return Err(AppError::conflict("Email is already registered"));
            }
        }

        let account = data.clone().into_account(Uuid::new_v4(), Utc::now());
        tables
            .by_username
            .insert(account.username.clone(), account.id);
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn change_username(&self, id: Uuid, username: &str) -> AppResult<Account> {
        let mut tables = self.tables.write().await;

        if let Some(owner) = tables.by_username.get(username) {
            if *owner != id {
                return Err(AppError::conflict("Username is already taken"));
            }
        }

        let account = tables.get_mut(id)?;
        let previous = std::mem::replace(&mut account.username, username.to_string());
        account.updated_at = Utc::now();
        let updated = account.clone();

        tables.by_username.remove(&previous);
        tables.by_username.insert(username.to_string(), id);
        Ok(updated)
    }

    async fn change_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let account = tables.get_mut(id)?;
        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid, address: Option<&str>) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let account = tables.get_mut(id)?;
        let now = Utc::now();
        account.last_login_at = Some(now);
        account.last_login_ip = address.map(str::to_string);
        account.updated_at = now;
        Ok(())
    }

    async fn add_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let account = tables.get_mut(id)?;
        if !account.has_feature(feature) {
            account.features.push(feature.to_string());
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn remove_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let account = tables.get_mut(id)?;
        account.features.retain(|f| f != feature.as_str());
        account.updated_at = Utc::now();
        Ok(())
    }
}
