//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **records**: JSON files under the data directory
//! - **queue**: bounded channel feeding the notification dispatcher
//! - **platform**: the host platform's bot API over reqwest
//!
//! Adapters translate between domain types and their wire or file shapes.
//! They contain no business logic.

pub mod platform;
pub mod queue;
pub mod records;

pub use platform::BotApiNotifier;
pub use queue::ChannelNotificationSink;
pub use records::JsonRecordStore;
