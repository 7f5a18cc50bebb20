//! Account registration and token subject resolution.

pub mod service;

pub use service::{AccountService, Registration};
