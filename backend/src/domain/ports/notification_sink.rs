//! Driven port the store publishes notifications through.
//!
//! Publishing is non-blocking and infallible from the caller's point of
//! view: a sink that cannot accept a notification logs and drops it.

use std::sync::Mutex;

use crate::domain::Notification;

#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification);
}

/// Sink that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn publish(&self, _notification: Notification) {}
}

/// Sink that keeps every notification in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    published: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSink {
    /// Remove and return everything published so far.
    pub fn take(&self) -> Vec<Notification> {
        let mut guard = self
            .published
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn publish(&self, notification: Notification) {
        self.published
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notification);
    }
}
