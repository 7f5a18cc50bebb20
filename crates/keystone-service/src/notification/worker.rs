//! Worker that drains the notification queue into a sink.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{debug, info, warn};

use keystone_core::events::Notice;

use super::sink::NotificationSink;

/// Consumes queued notices and delivers them with bounded concurrency.
pub struct NotificationWorker {
    receiver: mpsc::Receiver<Notice>,
    sink: Arc<dyn NotificationSink>,
    concurrency: usize,
}

impl std::fmt::Debug for NotificationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationWorker")
            .field("sink", &self.sink.name())
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl NotificationWorker {
    /// Create a new worker.
    pub fn new(
        receiver: mpsc::Receiver<Notice>,
        sink: Arc<dyn NotificationSink>,
        concurrency: usize,
    ) -> Self {
        Self {
            receiver,
            sink,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs until `shutdown` turns `true` or every producer is dropped.
    ///
    /// On shutdown, notices already queued are still delivered and the
    /// call returns once in-flight deliveries finish.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            sink = self.sink.name(),
            concurrency = self.concurrency,
            "Notification worker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Notification worker received shutdown signal");
                        break;
                    }
                }
                notice = self.receiver.recv() => match notice {
                    Some(notice) => dispatch(&self.sink, &semaphore, notice).await,
                    None => {
                        debug!("Notification queue closed");
                        break;
                    }
                },
            }
        }

        self.receiver.close();
        let mut drained = 0usize;
        while let Some(notice) = self.receiver.recv().await {
            dispatch(&self.sink, &semaphore, notice).await;
            drained += 1;
        }
        if drained > 0 {
            info!(count = drained, "Delivered notices queued before shutdown");
        }

        // All permits back means nothing is in flight.
        let _ = semaphore.acquire_many(self.concurrency as u32).await;
        info!("Notification worker stopped");
    }
}

async fn dispatch(sink: &Arc<dyn NotificationSink>, semaphore: &Arc<Semaphore>, notice: Notice) {
    let Ok(permit) = Arc::clone(semaphore).acquire_owned().await else {
        return;
    };
    let sink = Arc::clone(sink);

    tokio::spawn(async move {
        let _permit = permit;
        match sink.deliver(&notice).await {
            Ok(()) => debug!(
                kind = notice.kind(),
                account_id = %notice.account_id(),
                sink = sink.name(),
                "Notice delivered"
            ),
            Err(e) => warn!(
                kind = notice.kind(),
                account_id = %notice.account_id(),
                sink = sink.name(),
                error = %e,
                "Notice delivery failed"
            ),
        }
    });
}
