//! Core traits defined in `keystone-core` and implemented by other crates.

pub mod notification;

pub use notification::NotificationDispatcher;
