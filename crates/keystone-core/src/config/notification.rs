//! Notification delivery configuration.

use serde::{Deserialize, Serialize};

/// Where queued notices are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Write each notice as a structured log line.
    #[default]
    Log,
    /// POST each notice as JSON to `webhook_url`.
    Webhook,
}

/// Background notification queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether notices are delivered at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of notices waiting for delivery.
    #[serde(default = "default_capacity")]
    pub queue_capacity: usize,
    /// Number of notices delivered concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Delivery channel.
    #[serde(default)]
    pub sink: SinkKind,
    /// Target URL for the webhook sink.
    #[serde(default)]
    pub webhook_url: String,
    /// Per-delivery timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            queue_capacity: default_capacity(),
            concurrency: default_concurrency(),
            sink: SinkKind::default(),
            webhook_url: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    1024
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    10
}
