//! Delivery targets for queued notices.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use keystone_core::error::AppError;
use keystone_core::events::Notice;
use keystone_core::result::AppResult;

/// A destination that delivers one notice at a time.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver a single notice.
    async fn deliver(&self, notice: &Notice) -> AppResult<()>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Writes each notice as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notice: &Notice) -> AppResult<()> {
        match notice {
            Notice::Activation(n) => info!(
                account_id = %n.account_id,
                username = %n.username,
                email = %n.email,
                "Activation notice"
            ),
            Notice::PasswordChanged(n) => info!(
                account_id = %n.account_id,
                username = %n.username,
                changed_at = %n.changed_at,
                "Password changed notice"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// POSTs each notice as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Creates a webhook sink with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    keystone_core::ErrorKind::Configuration,
                    "Failed to build webhook client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, notice: &Notice) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(notice)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    keystone_core::ErrorKind::ExternalService,
                    "Webhook request failed",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Webhook responded with {status}"
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
