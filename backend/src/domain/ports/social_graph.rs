//! Driving port for the friend-request lifecycle and blocking.
//!
//! Every pair is in exactly one of: no relation, a pending request in one
//! direction, or friends. Blocking overlays that state and forces it back to
//! no relation.

use crate::domain::{Error, PublicId, Relation, UserProfile};

/// Profiles with a pending request involving the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequests {
    pub received: Vec<UserProfile>,
    pub sent: Vec<UserProfile>,
}

#[cfg_attr(test, mockall::automock)]
pub trait SocialGraph: Send + Sync {
    /// `actor` asks `target` to be friends.
    ///
    /// # Errors
    /// `Forbidden` for self-targeting, `NotFound` for unknown ids, `Blocked`
    /// when either side blocks the other, `InvalidState` when the pair is
    /// already friends or a request is pending in either direction.
    fn send_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    /// `actor` accepts the request `target` sent.
    fn accept_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    /// `actor` declines the request `target` sent.
    fn decline_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    /// `actor` withdraws the request it sent to `target`.
    fn cancel_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    /// Remove the friendship in both directions. Idempotent.
    fn unfriend(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    /// Block `target`, clearing friendship and pending requests both ways.
    fn block(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    /// Remove `target` from `actor`'s block list only.
    fn unblock(&self, actor: PublicId, target: PublicId) -> Result<(), Error>;

    fn relation_to(&self, viewer: PublicId, target: PublicId) -> Result<Relation, Error>;

    fn friends_of(&self, owner: PublicId) -> Result<Vec<UserProfile>, Error>;

    fn pending_requests(&self, owner: PublicId) -> Result<PendingRequests, Error>;
}
