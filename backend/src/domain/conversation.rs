//! Conversation ledger entries and previews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::identity::PublicId;

/// Maximum message length in characters.
pub const MESSAGE_MAX_CHARS: usize = 4096;
/// Maximum reaction length in characters.
pub const EMOJI_MAX_CHARS: usize = 16;

/// Identifier shared by both physical copies of one logical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub reactor_id: PublicId,
    #[schema(example = "👍")]
    pub emoji: String,
}

/// One physical copy of a message inside a ledger.
///
/// `id` is absent only for messages migrated from records that predate
/// shared identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub sender_id: PublicId,
    pub receiver_id: PublicId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub unread: bool,
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Replace `reactor`'s existing reaction or append a new one.
    pub fn set_reaction(&mut self, reactor: PublicId, emoji: &str) {
        match self.reactions.iter_mut().find(|r| r.reactor_id == reactor) {
            Some(existing) => emoji.clone_into(&mut existing.emoji),
            None => self.reactions.push(Reaction {
                reactor_id: reactor,
                emoji: emoji.to_owned(),
            }),
        }
    }

    /// Whether `other` is the partner-side copy of this message.
    pub fn is_copy_of(&self, other: &Message) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.timestamp == other.timestamp,
        }
    }
}

/// Summary row for the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPreview {
    pub partner_id: PublicId,
    pub partner_name: String,
    pub last_text: Option<String>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub unread_count: usize,
}
