//! Driven port delivering rendered text to a platform identity.

use async_trait::async_trait;

use crate::domain::PlatformId;

use super::define_port_error;

define_port_error! {
    /// Delivery failures. None of them are retried.
    pub enum PlatformNotifierError {
        /// The recipient has blocked the bot or never started it.
        Revoked { recipient: i64 } => "recipient {recipient} revoked contact",
        /// The platform answered with a non-success status.
        Rejected { status: u16, message: String } => "platform rejected delivery ({status}): {message}",
        /// The request never produced a response.
        Transport { message: String } => "platform request failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformNotifier: Send + Sync {
    /// Make one delivery attempt.
    async fn deliver(
        &self,
        recipient: PlatformId,
        text: &str,
    ) -> Result<(), PlatformNotifierError>;
}

/// Notifier that accepts everything without sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPlatformNotifier;

#[async_trait]
impl PlatformNotifier for NoOpPlatformNotifier {
    async fn deliver(
        &self,
        _recipient: PlatformId,
        _text: &str,
    ) -> Result<(), PlatformNotifierError> {
        Ok(())
    }
}
