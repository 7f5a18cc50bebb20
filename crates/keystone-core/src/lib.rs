//! # keystone-core
//!
//! Core crate for Keystone. Contains the configuration schema, the
//! notices emitted by account operations, the capability traits other
//! crates implement, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Keystone crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
