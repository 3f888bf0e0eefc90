//! On-disk record shapes and their conversion to domain accounts.
//!
//! Current records carry `"version": 1`. Records without a version field
//! come from the first generation of the service: snake_case keys,
//! timestamps rendered as `%Y-%m-%d %I:%M:%S %p` in UTC+05:30, ids as
//! strings, and a single-string `reaction` field on messages. They are
//! converted once at load and written back in the current shape on the next
//! flush.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{Message, PlatformId, PublicId, Reaction, UserProfile};

pub const CURRENT_VERSION: u32 = 1;

const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";
const LEGACY_OFFSET_SECONDS: i32 = 5 * 3_600 + 30 * 60;

/// A decoded file in either generation.
#[derive(Debug)]
pub enum Versioned<C, L> {
    Current(C),
    Legacy(L),
}

/// Decode `bytes`, dispatching on the `version` field.
pub fn decode<C, L>(bytes: &[u8]) -> Result<Versioned<C, L>, String>
where
    C: DeserializeOwned,
    L: DeserializeOwned,
{
    let value: Value = serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
    match value.get("version").map(Value::as_u64) {
        None => serde_json::from_value(value)
            .map(Versioned::Legacy)
            .map_err(|err| err.to_string()),
        Some(Some(v)) if v == u64::from(CURRENT_VERSION) => serde_json::from_value(value)
            .map(Versioned::Current)
            .map_err(|err| err.to_string()),
        Some(other) => Err(format!("unsupported record version {other:?}")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub version: u32,
    pub public_id: PublicId,
    pub platform_id: PlatformId,
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    pub joined_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    #[serde(default)]
    pub blocked_ids: BTreeSet<PublicId>,
    #[serde(default)]
    pub sent_request_ids: BTreeSet<PublicId>,
    #[serde(default)]
    pub received_request_ids: BTreeSet<PublicId>,
}

impl From<&UserProfile> for ProfileRecord {
    fn from(profile: &UserProfile) -> Self {
        Self {
            version: CURRENT_VERSION,
            public_id: profile.public_id,
            platform_id: profile.platform_id,
            display_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            joined_at: profile.joined_at,
            last_active_at: profile.last_active_at,
            blocked_ids: profile.blocked.clone(),
            sent_request_ids: profile.sent_requests.clone(),
            received_request_ids: profile.received_requests.clone(),
        }
    }
}

impl From<ProfileRecord> for UserProfile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            public_id: record.public_id,
            platform_id: record.platform_id,
            display_name: record.display_name,
            bio: record.bio,
            joined_at: record.joined_at,
            last_active_at: record.last_active_at,
            blocked: record.blocked_ids,
            sent_requests: record.sent_request_ids,
            received_requests: record.received_request_ids,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyProfile {
    pub unique_id: String,
    pub telegram_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub joined_date: Option<String>,
    #[serde(default)]
    pub last_active_timestamp: Option<String>,
    #[serde(default)]
    pub blocked_users: Vec<String>,
    #[serde(default)]
    pub sent_requests: Vec<String>,
    #[serde(default)]
    pub received_requests: Vec<String>,
}

impl LegacyProfile {
    pub fn migrate(self) -> Result<UserProfile, String> {
        let public_id: PublicId = self
            .unique_id
            .parse()
            .map_err(|err| format!("legacy unique_id {:?}: {err}", self.unique_id))?;
        let platform_id = PlatformId::new(self.telegram_id);
        let joined_at = legacy_timestamp(self.joined_date.as_deref());
        let last_active_at = self
            .last_active_timestamp
            .as_deref()
            .map_or(joined_at, |raw| legacy_timestamp(Some(raw)));
        let display_name = self
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("User_{platform_id}"));

        Ok(UserProfile {
            public_id,
            platform_id,
            display_name,
            bio: self.bio.unwrap_or_default(),
            joined_at,
            last_active_at,
            blocked: legacy_ids(&self.blocked_users),
            sent_requests: legacy_ids(&self.sent_requests),
            received_requests: legacy_ids(&self.received_requests),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsRecord {
    pub version: u32,
    pub friends: BTreeSet<PublicId>,
}

impl FriendsRecord {
    pub fn new(friends: &BTreeSet<PublicId>) -> Self {
        Self {
            version: CURRENT_VERSION,
            friends: friends.clone(),
        }
    }
}

/// Legacy friend lists are bare arrays of id strings.
pub type LegacyFriends = Vec<String>;

pub fn migrate_friends(legacy: &LegacyFriends) -> BTreeSet<PublicId> {
    legacy_ids(legacy)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationsRecord {
    pub version: u32,
    pub ledgers: BTreeMap<PublicId, Vec<Message>>,
}

impl ConversationsRecord {
    pub fn new(ledgers: &BTreeMap<PublicId, Vec<Message>>) -> Self {
        Self {
            version: CURRENT_VERSION,
            ledgers: ledgers.clone(),
        }
    }
}

/// Legacy history: partner id string to message list.
pub type LegacyHistory = BTreeMap<String, Vec<LegacyMessage>>;

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyMessage {
    pub sender_uid: String,
    pub receiver_uid: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub reactions: Vec<LegacyReaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyReaction {
    pub reactor_uid: String,
    pub emoji: String,
}

pub fn migrate_history(legacy: LegacyHistory) -> BTreeMap<PublicId, Vec<Message>> {
    let mut ledgers = BTreeMap::new();
    for (partner, messages) in legacy {
        let Ok(partner_id) = partner.parse::<PublicId>() else {
            warn!(partner = %partner, "dropping legacy ledger with malformed partner id");
            continue;
        };
        let migrated: Vec<Message> = messages.into_iter().filter_map(migrate_message).collect();
        ledgers.insert(partner_id, migrated);
    }
    ledgers
}

fn migrate_message(legacy: LegacyMessage) -> Option<Message> {
    let sender_id = legacy.sender_uid.parse::<PublicId>().ok()?;
    let receiver_id = legacy.receiver_uid.parse::<PublicId>().ok()?;
    let reactions = legacy
        .reactions
        .into_iter()
        .filter_map(|r| {
            r.reactor_uid.parse::<PublicId>().ok().map(|reactor_id| Reaction {
                reactor_id,
                emoji: r.emoji,
            })
        })
        .collect();
    Some(Message {
        id: None,
        sender_id,
        receiver_id,
        text: legacy.text,
        timestamp: legacy_timestamp(legacy.timestamp.as_deref()),
        unread: legacy.unread,
        reactions,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityIndexRecord {
    pub version: u32,
    pub entries: BTreeMap<PublicId, PlatformId>,
}

/// Parse a legacy timestamp, falling back to the Unix epoch.
pub fn legacy_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), LEGACY_TIMESTAMP_FORMAT).ok())
        .and_then(|naive| {
            FixedOffset::east_opt(LEGACY_OFFSET_SECONDS)
                .and_then(|offset| offset.from_local_datetime(&naive).single())
        })
        .map_or_else(DateTime::<Utc>::default, |local| local.with_timezone(&Utc))
}

fn legacy_ids(raw: &[String]) -> BTreeSet<PublicId> {
    raw.iter()
        .filter_map(|id| match id.parse::<PublicId>() {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(id = %id, error = %err, "dropping malformed legacy id");
                None
            }
        })
        .collect()
}
