//! Notification manager
//!
//! Dispatches backup events to every configured sink (desktop, Discord webhook)
//! without waiting for delivery. Failures are logged and discarded.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::NotificationConfig;

/// Events reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupEvent {
    Started,
    Completed,
    Failed,
}

impl BackupEvent {
    pub fn title(&self) -> &'static str {
        match self {
            BackupEvent::Started => "Backup Started",
            BackupEvent::Completed => "Backup Completed",
            BackupEvent::Failed => "Backup Failed",
        }
    }
}

/// Notification payload handed to sinks
#[derive(Debug, Clone)]
pub struct Notification {
    pub event: BackupEvent,
    pub title: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Desktop notifications are not supported on platform '{0}'")]
    UnsupportedPlatform(String),

    #[error("{channel} notification failed: {message}")]
    Delivery {
        channel: &'static str,
        message: String,
    },
}

/// Capability the backup pipeline reports events through
///
/// Implementations must never block on delivery and never fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: BackupEvent, message: &str);
}

/// A single delivery channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Channel name (for logging)
    fn channel(&self) -> &'static str;

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Fans events out to sinks on background tasks
pub struct NotificationManager {
    sinks: Vec<Arc<dyn NotificationSink>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl NotificationManager {
    /// Create a manager from settings
    ///
    /// `desktop_sink` is the platform sink chosen at startup; it is only used
    /// when desktop notifications are enabled.
    pub fn new(config: &NotificationConfig, desktop_sink: Arc<dyn NotificationSink>) -> Self {
        let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();

        if config.desktop {
            sinks.push(desktop_sink);
        }

        if !config.discord_webhook_url.is_empty() {
            sinks.push(Arc::new(DiscordSink::new(&config.discord_webhook_url)));
        }

        Self::with_sinks(sinks)
    }

    pub fn with_sinks(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self {
            sinks,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Wait up to `timeout` for deliveries still in flight
    pub async fn flush(&self, timeout: Duration) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };

        if handles.is_empty() {
            return;
        }

        debug!("Waiting for {} pending notification(s)", handles.len());
        let all = futures::future::join_all(handles);
        if tokio::time::timeout(timeout, all).await.is_err() {
            warn!("Gave up waiting for notifications after {:?}", timeout);
        }
    }
}

impl Notifier for NotificationManager {
    fn notify(&self, event: BackupEvent, message: &str) {
        info!("{}: {}", event.title(), message);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, skipping notification");
                return;
            }
        };

        let notification = Notification {
            event,
            title: event.title().to_string(),
            message: message.to_string(),
        };

        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let notification = notification.clone();
            let handle = runtime.spawn(async move {
                match sink.send(&notification).await {
                    Ok(()) => debug!("Delivered '{}' via {}", notification.title, sink.channel()),
                    Err(NotificationError::UnsupportedPlatform(os)) => {
                        error!("Desktop notifications are not supported on platform '{}'", os)
                    }
                    Err(e) => warn!("Failed to send notification: {}", e),
                }
            });

            if let Ok(mut pending) = self.pending.lock() {
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
        }
    }
}

/// Discord embed color codes (decimal)
#[derive(Debug, Clone, Copy)]
pub enum NotificationColor {
    /// Red - for failures
    Failure = 15158332,    // #E74C3C
    /// Green - for success
    Success = 3066993,     // #2ECC71
    /// Blue - for info
    Info = 3447003,        // #3498DB
}

impl NotificationColor {
    fn as_decimal(&self) -> u32 {
        *self as u32
    }
}

/// Discord webhook payload
#[derive(Debug, Serialize)]
struct DiscordPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<DiscordFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct DiscordFooter {
    text: String,
}

/// Posts events to a Discord webhook
pub struct DiscordSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordSink {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, notification: &Notification) -> DiscordPayload {
        let (color, emoji) = match notification.event {
            BackupEvent::Started => (NotificationColor::Info, "\u{1F4E6}"), // Package
            BackupEvent::Completed => (NotificationColor::Success, "\u{2705}"), // Green check
            BackupEvent::Failed => (NotificationColor::Failure, "\u{274C}"), // Red X
        };

        // Truncate message if too long
        let description = if notification.message.chars().count() > 2000 {
            let truncated: String = notification.message.chars().take(1997).collect();
            format!("{}...", truncated)
        } else {
            notification.message.clone()
        };

        let embed = DiscordEmbed {
            title: format!("{} {}", emoji, notification.title),
            description: Some(description),
            color: color.as_decimal(),
            footer: Some(DiscordFooter {
                text: "db-backup".to_string(),
            }),
            timestamp: Some(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        };

        DiscordPayload {
            username: Some("DB Backup".to_string()),
            embeds: vec![embed],
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    fn channel(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let payload = self.build_payload(notification);
        let delivery_error = |message: String| NotificationError::Delivery {
            channel: "discord",
            message,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .timeout(Duration::from_secs(30))
            .json(&payload)
            .send()
            .await
            .map_err(|e| delivery_error(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(delivery_error(format!("status {}: {}", status, body)))
        }
    }
}

/// Recording notifier for tests
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;

    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        pub events: Arc<Mutex<Vec<(BackupEvent, String)>>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Events in the order they were emitted
        pub fn events(&self) -> Vec<BackupEvent> {
            self.events.lock().unwrap().iter().map(|(e, _)| *e).collect()
        }

        pub fn messages(&self) -> Vec<String> {
            self.events.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, event: BackupEvent, message: &str) {
            self.events.lock().unwrap().push((event, message.to_string()));
        }
    }

    /// Sink that records deliveries, optionally failing each one
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub delivered: Arc<Mutex<Vec<Notification>>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn titles(&self) -> Vec<String> {
            self.delivered.lock().unwrap().iter().map(|n| n.title.clone()).collect()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn channel(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
            self.delivered.lock().unwrap().push(notification.clone());
            if self.fail {
                return Err(NotificationError::Delivery {
                    channel: "recording",
                    message: "sink unavailable".to_string(),
                });
            }
            Ok(())
        }
    }
}
