//! Domain ports: the traits adapters implement (driven) or call (driving).

mod macros;
pub(crate) use macros::define_port_error;

mod conversations;
mod identity_registry;
mod notification_sink;
mod platform_notifier;
mod public_id_source;
mod record_store;
mod social_graph;

#[cfg(test)]
pub use conversations::MockConversations;
pub use conversations::Conversations;
#[cfg(test)]
pub use identity_registry::MockIdentityRegistry;
pub use identity_registry::IdentityRegistry;
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{
    NoOpNotificationSink, NotificationSink, RecordingNotificationSink,
};
#[cfg(test)]
pub use platform_notifier::MockPlatformNotifier;
pub use platform_notifier::{NoOpPlatformNotifier, PlatformNotifier, PlatformNotifierError};
#[cfg(test)]
pub use public_id_source::MockPublicIdSource;
pub use public_id_source::{PublicIdSource, RandomPublicIds, ScriptedPublicIds};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{FlushReport, NoOpRecordStore, RecordStore, RecordStoreError};
#[cfg(test)]
pub use social_graph::MockSocialGraph;
pub use social_graph::{PendingRequests, SocialGraph};
