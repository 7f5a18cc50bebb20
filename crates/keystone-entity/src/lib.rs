//! # keystone-entity
//!
//! Domain entity models for Keystone. Database entities derive
//! `sqlx::FromRow` alongside the usual serde traits.

pub mod account;

pub use account::{Account, CreateAccount, Feature};
