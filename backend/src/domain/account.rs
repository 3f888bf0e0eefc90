//! Per-identity aggregate held by the social store and persisted on flush.

use std::collections::{BTreeMap, BTreeSet};

use super::conversation::Message;
use super::identity::PublicId;
use super::profile::UserProfile;

/// Everything one identity owns: profile, friend set, and ledgers keyed by
/// partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub profile: UserProfile,
    pub friends: BTreeSet<PublicId>,
    pub ledgers: BTreeMap<PublicId, Vec<Message>>,
}

impl Account {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            friends: BTreeSet::new(),
            ledgers: BTreeMap::new(),
        }
    }

    pub fn public_id(&self) -> PublicId {
        self.profile.public_id
    }
}

/// Point-in-time copy of every account, ordered by public id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub accounts: Vec<Account>,
}

impl StoreSnapshot {
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
