//! Drains the notification queue into the platform notifier.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::notification::Notification;
use super::ports::{PlatformNotifier, PlatformNotifierError};

/// Consumes queued notifications and makes one delivery attempt for each.
pub struct NotificationDispatcher {
    queue: mpsc::Receiver<Notification>,
    notifier: Arc<dyn PlatformNotifier>,
}

impl NotificationDispatcher {
    pub fn new(queue: mpsc::Receiver<Notification>, notifier: Arc<dyn PlatformNotifier>) -> Self {
        Self { queue, notifier }
    }

    /// Run until every sender has been dropped and the queue is drained.
    pub async fn run(mut self) {
        while let Some(notification) = self.queue.recv().await {
            self.dispatch(&notification).await;
        }
        info!("notification queue closed; dispatcher stopping");
    }

    async fn dispatch(&self, notification: &Notification) {
        let text = notification.render();
        match self.notifier.deliver(notification.recipient, &text).await {
            Ok(()) => debug!(recipient = %notification.recipient, "notification delivered"),
            Err(err @ PlatformNotifierError::Revoked { .. }) => {
                warn!(error = %err, "notification not delivered");
            }
            Err(err) => error!(
                recipient = %notification.recipient,
                error = %err,
                "notification delivery failed"
            ),
        }
    }
}
