//! # keystone-database
//!
//! PostgreSQL connection management, embedded migrations, and the account
//! repository implementations (Postgres and in-memory).

pub mod connection;
pub mod migration;
pub mod provider;
pub mod repositories;

pub use connection::DatabasePool;
pub use provider::AccountStore;
pub use repositories::{AccountRepository, MemoryAccountRepository, PgAccountRepository};
