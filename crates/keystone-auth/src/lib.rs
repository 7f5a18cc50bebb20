//! # keystone-auth
//!
//! Credential and token primitives for Keystone.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing, fail-closed verification, and the new-password policy
//! - `jwt`: HS256 session token issuance and resolution

pub mod jwt;
pub mod password;

pub use jwt::{Claims, TokenIssuer};
pub use password::{PasswordHasher, PasswordValidator};
