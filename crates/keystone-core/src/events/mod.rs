//! Notices emitted by account operations.
//!
//! Notices are handed to a [`NotificationDispatcher`](crate::traits::NotificationDispatcher)
//! after the originating operation has committed. Delivery is best-effort.

pub mod account;

pub use account::{ActivationNotice, Notice, PasswordChangedNotice};
