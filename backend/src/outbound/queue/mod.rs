//! Bounded in-process queue between the social store and the dispatcher.
//!
//! The store publishes from inside request handlers, so publishing never
//! waits: a full queue drops the notification and logs a warning.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, warn};

use crate::domain::Notification;
use crate::domain::ports::NotificationSink;

/// Sink feeding a [`crate::domain::NotificationDispatcher`].
#[derive(Debug, Clone)]
pub struct ChannelNotificationSink {
    sender: mpsc::Sender<Notification>,
}

impl ChannelNotificationSink {
    /// Create a sink and the receiver its dispatcher drains.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn publish(&self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => warn!(
                recipient = %dropped.recipient,
                "notification queue full; dropping notification"
            ),
            Err(TrySendError::Closed(dropped)) => error!(
                recipient = %dropped.recipient,
                "notification dispatcher stopped; dropping notification"
            ),
        }
    }
}
