//! Background notification delivery.
//!
//! Account operations hand notices to a [`NotificationQueue`]; a single
//! [`NotificationWorker`] drains it into the configured sink.

pub mod queue;
pub mod sink;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use keystone_core::config::{NotificationConfig, SinkKind};
use keystone_core::result::AppResult;
use keystone_core::traits::NotificationDispatcher;

pub use queue::{DiscardDispatcher, NotificationQueue};
pub use sink::{LogSink, NotificationSink, WebhookSink};
pub use worker::NotificationWorker;

/// Builds the dispatcher described by `config` and spawns its worker.
///
/// When notifications are disabled the returned dispatcher discards every
/// notice and no worker is spawned.
pub fn start(
    config: &NotificationConfig,
    shutdown: watch::Receiver<bool>,
) -> AppResult<(Arc<dyn NotificationDispatcher>, Option<JoinHandle<()>>)> {
    if !config.enabled {
        info!("Notifications disabled");
        return Ok((Arc::new(DiscardDispatcher), None));
    }

    let sink: Arc<dyn NotificationSink> = match config.sink {
        SinkKind::Log => Arc::new(LogSink),
        SinkKind::Webhook => Arc::new(WebhookSink::new(
            config.webhook_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?),
    };

    let (queue, receiver) = NotificationQueue::new(config.queue_capacity);
    let worker = NotificationWorker::new(receiver, sink, config.concurrency);
    let handle = tokio::spawn(worker.run(shutdown));

    Ok((Arc::new(queue), Some(handle)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_spawns_nothing() {
        let (_tx, rx) = watch::channel(false);
        let config = NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        };
        let (_dispatcher, handle) = start(&config, rx).unwrap();
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_worker_exits_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let (_dispatcher, handle) = start(&NotificationConfig::default(), rx).unwrap();

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.unwrap())
            .await
            .unwrap()
            .unwrap();
    }
}
