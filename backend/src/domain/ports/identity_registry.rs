//! Driving port for identity binding and profile lookups.

use crate::domain::{Error, LaunchIdentity, PlatformId, PublicId, UserProfile};

/// Maps platform identities to public ids and owns profile metadata.
///
/// All methods act on the in-memory cache and return immediately.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityRegistry: Send + Sync {
    /// Return the caller's public id, minting one and creating a profile on
    /// first contact. Repeated calls for the same platform id return the
    /// same public id.
    fn resolve_or_create(&self, identity: &LaunchIdentity) -> Result<PublicId, Error>;

    fn lookup_by_platform_id(&self, platform_id: PlatformId) -> Option<PublicId>;

    /// Current profile for `public_id`, or `None` when unknown.
    fn profile(&self, public_id: PublicId) -> Option<UserProfile>;

    /// Stamp `lastActiveAt` with the current time. Unknown ids are ignored.
    fn touch_activity(&self, platform_id: PlatformId);

    /// Replace the bio. Length limits are enforced by the caller.
    fn update_bio(&self, public_id: PublicId, bio: &str) -> Result<(), Error>;
}
