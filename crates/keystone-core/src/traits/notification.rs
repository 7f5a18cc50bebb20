//! Outbound notification capability.

use async_trait::async_trait;

use crate::events::{ActivationNotice, PasswordChangedNotice};
use crate::result::AppResult;

/// Accepts notices for delivery.
///
/// Implementations must return promptly; callers fire these from a spawned
/// task and only log the outcome.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync + 'static {
    /// Hand off an activation notice for a newly registered account.
    async fn send_activation(&self, notice: ActivationNotice) -> AppResult<()>;

    /// Hand off a password-changed notice.
    async fn send_password_changed(&self, notice: PasswordChangedNotice) -> AppResult<()>;
}
