//! User-visible notifications.
//!
//! The optimistic executor falls back to a [`Notifier`] whenever an update
//! fails without a caller-supplied error handler. Front ends plug in their
//! own toast queue; the default simply logs.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }
}

/// Sink for notifications shown to the operator.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                event!(Level::WARN, message = %notification.message, "notification")
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                event!(Level::INFO, message = %notification.message, "notification")
            }
        }
    }
}

/// Forwards notifications into a channel, e.g. a UI toast queue.
///
/// Notifications sent after the receiver is gone are dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

pub fn default_notifier() -> Arc<dyn Notifier> {
    Arc::new(TracingNotifier)
}
