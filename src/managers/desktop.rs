//! OS-level desktop notification sinks
//!
//! One sink per platform, chosen once at startup from the host OS:
//! - Linux: `notify-send`
//! - macOS: `osascript` (`display notification`)
//! - Windows: PowerShell balloon tip

use super::notification::{Notification, NotificationError, NotificationSink};
use crate::utils::command::{ensure_program, run_command};
use async_trait::async_trait;
use std::sync::Arc;

/// Host platform as far as notifications are concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }
}

/// Sink for `platform`
pub fn platform_sink(platform: Platform) -> Arc<dyn NotificationSink> {
    match platform {
        Platform::Linux => Arc::new(LinuxNotifySend),
        Platform::MacOs => Arc::new(MacOsNotification),
        Platform::Windows => Arc::new(WindowsBalloon),
        Platform::Other(os) => Arc::new(UnsupportedPlatform { os }),
    }
}

async fn deliver(
    channel: &'static str,
    program: &str,
    args: &[String],
) -> Result<(), NotificationError> {
    let to_error = |e: anyhow::Error| NotificationError::Delivery {
        channel,
        message: format!("{:#}", e),
    };

    ensure_program(program).map_err(to_error)?;
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run_command(program, &arg_refs, &[]).await.map_err(to_error)?;
    Ok(())
}

pub struct LinuxNotifySend;

impl LinuxNotifySend {
    pub fn command(title: &str, message: &str) -> (&'static str, Vec<String>) {
        (
            "notify-send",
            vec![
                "--app-name=db-backup".to_string(),
                title.to_string(),
                message.to_string(),
            ],
        )
    }
}

#[async_trait]
impl NotificationSink for LinuxNotifySend {
    fn channel(&self) -> &'static str {
        "notify-send"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let (program, args) = Self::command(&notification.title, &notification.message);
        deliver(self.channel(), program, &args).await
    }
}

pub struct MacOsNotification;

impl MacOsNotification {
    fn quote(text: &str) -> String {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    }

    pub fn command(title: &str, message: &str) -> (&'static str, Vec<String>) {
        let script = format!(
            "display notification {} with title {}",
            Self::quote(message),
            Self::quote(title)
        );
        ("osascript", vec!["-e".to_string(), script])
    }
}

#[async_trait]
impl NotificationSink for MacOsNotification {
    fn channel(&self) -> &'static str {
        "osascript"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let (program, args) = Self::command(&notification.title, &notification.message);
        deliver(self.channel(), program, &args).await
    }
}

pub struct WindowsBalloon;

impl WindowsBalloon {
    fn quote(text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    pub fn command(title: &str, message: &str) -> (&'static str, Vec<String>) {
        let script = format!(
            "Add-Type -AssemblyName System.Windows.Forms; \
             Add-Type -AssemblyName System.Drawing; \
             $n = New-Object System.Windows.Forms.NotifyIcon; \
             $n.Icon = [System.Drawing.SystemIcons]::Information; \
             $n.BalloonTipTitle = {}; \
             $n.BalloonTipText = {}; \
             $n.Visible = $true; \
             $n.ShowBalloonTip(5000); \
             Start-Sleep -Seconds 5; \
             $n.Dispose()",
            Self::quote(title),
            Self::quote(message)
        );
        (
            "powershell",
            vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                script,
            ],
        )
    }
}

#[async_trait]
impl NotificationSink for WindowsBalloon {
    fn channel(&self) -> &'static str {
        "powershell"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let (program, args) = Self::command(&notification.title, &notification.message);
        deliver(self.channel(), program, &args).await
    }
}

/// Fallback for platforms without a notification channel
pub struct UnsupportedPlatform {
    os: String,
}

#[async_trait]
impl NotificationSink for UnsupportedPlatform {
    fn channel(&self) -> &'static str {
        "unsupported"
    }

    async fn send(&self, _notification: &Notification) -> Result<(), NotificationError> {
        Err(NotificationError::UnsupportedPlatform(self.os.clone()))
    }
}
