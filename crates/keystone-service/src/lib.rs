//! # keystone-service
//!
//! Business logic for Keystone. [`AccountService`] orchestrates the account
//! repository, the password hasher, the token issuer, and the notification
//! dispatcher; the `notification` module provides the bounded delivery
//! queue behind that dispatcher.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod notification;

pub use account::{AccountService, Registration};
pub use notification::{NotificationQueue, NotificationSink, NotificationWorker};
