//! User profiles, pairwise relation snapshots, and presence strings.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identity::{PlatformId, PublicId};

/// Maximum bio length in characters.
pub const BIO_MAX_CHARS: usize = 150;

/// Profile state for one platform identity.
///
/// ## Invariants
/// - `sent_requests`, `received_requests` and the owner's friend set are
///   pairwise disjoint for any counterpart.
/// - The three id sets never contain `public_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub public_id: PublicId,
    pub platform_id: PlatformId,
    pub display_name: String,
    pub bio: String,
    pub joined_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub blocked: BTreeSet<PublicId>,
    pub sent_requests: BTreeSet<PublicId>,
    pub received_requests: BTreeSet<PublicId>,
}

impl UserProfile {
    /// Fresh profile for a first contact.
    pub fn new(
        public_id: PublicId,
        platform_id: PlatformId,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            public_id,
            platform_id,
            display_name: display_name.into(),
            bio: String::new(),
            joined_at: now,
            last_active_at: now,
            blocked: BTreeSet::new(),
            sent_requests: BTreeSet::new(),
            received_requests: BTreeSet::new(),
        }
    }

    pub fn blocks(&self, other: PublicId) -> bool {
        self.blocked.contains(&other)
    }
}

/// Relationship between a viewer and a target, computed on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub is_self: bool,
    pub is_friend: bool,
    pub is_blocked_by_viewer: bool,
    pub has_sent_pending_request: bool,
    pub has_received_pending_request: bool,
}

impl Relation {
    pub fn self_view() -> Self {
        Self {
            is_self: true,
            ..Self::default()
        }
    }
}

/// Render how long ago a user was last active.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use companion::domain::presence;
///
/// let now = Utc::now();
/// assert_eq!(presence(now - Duration::seconds(5), now), "online");
/// assert_eq!(presence(now - Duration::minutes(90), now), "1h ago");
/// ```
pub fn presence(last_active_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - last_active_at).num_seconds();
    match seconds {
        s if s < 30 => "online".to_owned(),
        s if s < 120 => "1m ago".to_owned(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}
