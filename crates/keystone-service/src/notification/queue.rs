//! Bounded in-process notification queue.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use keystone_core::error::AppError;
use keystone_core::events::{ActivationNotice, Notice, PasswordChangedNotice};
use keystone_core::result::AppResult;
use keystone_core::traits::NotificationDispatcher;

/// Producer side of the notification queue.
///
/// Enqueueing never waits: when the queue is full the notice is dropped and
/// an `ExternalService` error is returned for the caller to log.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<Notice>,
}

impl NotificationQueue {
    /// Creates a queue holding at most `capacity` pending notices.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notice>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueues a notice without waiting.
    pub fn enqueue(&self, notice: Notice) -> AppResult<()> {
        match self.sender.try_send(notice) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(notice)) => {
                warn!(
                    kind = notice.kind(),
                    account_id = %notice.account_id(),
                    "Notification queue full, dropping notice"
                );
                Err(AppError::external_service("Notification queue is full"))
            }
            Err(TrySendError::Closed(notice)) => {
                warn!(kind = notice.kind(), "Notification queue closed, dropping notice");
                Err(AppError::external_service("Notification queue is closed"))
            }
        }
    }
}

#[async_trait]
impl NotificationDispatcher for NotificationQueue {
    async fn send_activation(&self, notice: ActivationNotice) -> AppResult<()> {
        self.enqueue(Notice::Activation(notice))
    }

    async fn send_password_changed(&self, notice: PasswordChangedNotice) -> AppResult<()> {
        self.enqueue(Notice::PasswordChanged(notice))
    }
}

/// Dispatcher used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardDispatcher;

#[async_trait]
impl NotificationDispatcher for DiscardDispatcher {
    async fn send_activation(&self, _notice: ActivationNotice) -> AppResult<()> {
        Ok(())
    }

    async fn send_password_changed(&self, _notice: PasswordChangedNotice) -> AppResult<()> {
        Ok(())
    }
}
