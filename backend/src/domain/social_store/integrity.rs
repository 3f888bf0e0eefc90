//! Consistency checks over a snapshot of the graph.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{Account, PublicId};

use super::SocialStore;

/// A broken pairwise invariant found in the stored graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// `owner` lists `other` as a friend but not vice versa.
    AsymmetricFriendship { owner: PublicId, other: PublicId },
    /// `sender` lists a sent request that `receiver` does not hold.
    AsymmetricRequest { sender: PublicId, receiver: PublicId },
    /// `owner` is both friends with `other` and has a pending request.
    FriendAndPending { owner: PublicId, other: PublicId },
    /// `owner` references an id with no account.
    DanglingReference { owner: PublicId, other: PublicId },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsymmetricFriendship { owner, other } => {
                write!(f, "{owner} lists {other} as a friend without reciprocation")
            }
            Self::AsymmetricRequest { sender, receiver } => {
                write!(f, "request {sender} -> {receiver} is only recorded on one side")
            }
            Self::FriendAndPending { owner, other } => {
                write!(f, "{owner} is friends with {other} and has a pending request")
            }
            Self::DanglingReference { owner, other } => {
                write!(f, "{owner} references unknown user {other}")
            }
        }
    }
}

impl SocialStore {
    /// Report every broken pairwise invariant in the current state.
    pub fn integrity_violations(&self) -> Vec<IntegrityViolation> {
        check(&self.snapshot().accounts)
    }
}

fn check(accounts: &[Account]) -> Vec<IntegrityViolation> {
    let by_id: HashMap<PublicId, &Account> =
        accounts.iter().map(|a| (a.public_id(), a)).collect();
    let mut violations = Vec::new();

    for account in accounts {
        let owner = account.public_id();
        let profile = &account.profile;

        for &other in &account.friends {
            match by_id.get(&other) {
                None => violations.push(IntegrityViolation::DanglingReference { owner, other }),
                Some(peer) if !peer.friends.contains(&owner) => {
                    violations.push(IntegrityViolation::AsymmetricFriendship { owner, other });
                }
                Some(_) => {}
            }
            if profile.sent_requests.contains(&other) || profile.received_requests.contains(&other)
            {
                violations.push(IntegrityViolation::FriendAndPending { owner, other });
            }
        }

        for &receiver in &profile.sent_requests {
            match by_id.get(&receiver) {
                None => violations.push(IntegrityViolation::DanglingReference {
                    owner,
                    other: receiver,
                }),
                Some(peer) if !peer.profile.received_requests.contains(&owner) => {
                    violations.push(IntegrityViolation::AsymmetricRequest {
                        sender: owner,
                        receiver,
                    });
                }
                Some(_) => {}
            }
        }

        for &sender in &profile.received_requests {
            match by_id.get(&sender) {
                None => violations.push(IntegrityViolation::DanglingReference {
                    owner,
                    other: sender,
                }),
                Some(peer) if !peer.profile.sent_requests.contains(&owner) => {
                    violations.push(IntegrityViolation::AsymmetricRequest {
                        sender,
                        receiver: owner,
                    });
                }
                Some(_) => {}
            }
        }
    }

    violations
}
