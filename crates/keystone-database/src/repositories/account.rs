//! PostgreSQL account repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use keystone_core::error::{AppError, ErrorKind};
use keystone_core::result::AppResult;
use keystone_entity::account::{Account, CreateAccount, Feature};

use super::AccountRepository;

/// Account repository backed by the `accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write failure, turning unique violations into `Conflict`.
fn map_write_error(e: sqlx::Error, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some("accounts_email_key") => AppError::conflict("Email is already registered"),
                _ => AppError::conflict("Username is already taken"),
            }
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn get_by_username(&self, username: &str) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by username", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Account '{username}' not found")))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by id", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, username, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create account"))
    }

    async fn change_username(&self, id: Uuid, username: &str) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET username = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to change username"))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn change_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to change password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid, address: Option<&str>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET last_login_at = NOW(), last_login_ip = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(address)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update last login", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    async fn add_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET features = CASE \
                 WHEN $2::text = ANY(features) THEN features \
                 ELSE array_append(features, $2::text) END, \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(feature.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add feature", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    async fn remove_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET features = array_remove(features, $2::text), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(feature.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove feature", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }
}
