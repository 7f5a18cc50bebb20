//! Account persistence.
//!
//! [`AccountRepository`] is the capability the service and handlers depend
//! on. Missing accounts surface as `ErrorKind::NotFound`, uniqueness
//! violations as `ErrorKind::Conflict`, and storage failures as
//! `ErrorKind::Database`.

pub mod account;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use keystone_core::AppResult;
use keystone_entity::account::{Account, CreateAccount, Feature};

pub use account::PgAccountRepository;
pub use memory::MemoryAccountRepository;

/// Account store operations.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Find an account by its username.
    async fn get_by_username(&self, username: &str) -> AppResult<Account>;

    /// Find an account by its identifier.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Account>;

    /// Insert a new account. Fails with `Conflict` if the username or email
    /// is taken; the check and the insert are one atomic step.
    async fn create(&self, data: &CreateAccount) -> AppResult<Account>;

    /// Rename an account and return the updated row.
    async fn change_username(&self, id: Uuid, username: &str) -> AppResult<Account>;

    /// Replace the stored password hash.
    async fn change_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Record a successful login from `address`.
    async fn update_last_login(&self, id: Uuid, address: Option<&str>) -> AppResult<()>;

    /// Attach a feature flag. Attaching an existing flag is a no-op.
    async fn add_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()>;

    /// Detach a feature flag. Detaching an absent flag is a no-op.
    async fn remove_feature(&self, id: Uuid, feature: &Feature) -> AppResult<()>;
}
