//! Domain types, ports, and services.
//!
//! Everything here is transport agnostic. The HTTP adapter, the record store
//! and the platform notifier reach the domain only through [`ports`].

mod account;
mod conversation;
mod error;
pub mod flush_worker;
mod identity;
pub mod launch;
mod notification;
pub mod notification_dispatcher;
pub mod ports;
mod profile;
pub mod social_store;
mod trace_id;

pub use self::account::{Account, StoreSnapshot};
pub use self::conversation::{
    ConversationPreview, EMOJI_MAX_CHARS, MESSAGE_MAX_CHARS, Message, MessageId, Reaction,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::flush_worker::FlushWorker;
pub use self::identity::{
    IdentityValidationError, LaunchIdentity, PUBLIC_ID_MAX, PUBLIC_ID_MIN, PlatformId, PublicId,
};
pub use self::launch::{LaunchError, LaunchVerifier};
pub use self::notification::{Notification, NotificationKind, escape_markdown};
pub use self::notification_dispatcher::NotificationDispatcher;
pub use self::profile::{BIO_MAX_CHARS, Relation, UserProfile, presence};
pub use self::social_store::{IntegrityViolation, SocialStore};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
