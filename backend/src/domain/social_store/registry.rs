//! Identity registry operations.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::domain::ports::IdentityRegistry;
use crate::domain::{Account, Error, LaunchIdentity, PlatformId, PublicId, UserProfile};

use super::{Index, SocialStore, lock};

/// Candidate ids tried before giving up on minting.
pub(super) const MAX_MINT_ATTEMPTS: usize = 32;

impl SocialStore {
    fn mint(&self, index: &Index) -> Result<PublicId, Error> {
        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let candidate = self.ids.candidate().map_err(|err| {
                error!(error = %err, "public id source produced an unusable id");
                Error::internal("could not allocate a public id")
            })?;
            if !index.accounts.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!(attempt, candidate = %candidate, "public id collision; retrying");
        }
        Err(Error::internal("could not allocate a public id"))
    }
}

impl IdentityRegistry for SocialStore {
    fn resolve_or_create(&self, identity: &LaunchIdentity) -> Result<PublicId, Error> {
        let platform_id = identity.platform_id;
        if let Some(existing) = self.lookup_by_platform_id(platform_id) {
            return Ok(existing);
        }

        let mut index = self.write_index();
        // Another request may have registered the same identity meanwhile.
        if let Some(existing) = index.public_ids.get(&platform_id) {
            return Ok(*existing);
        }

        let public_id = self.mint(&index)?;
        let display_name = identity.display_name();
        let profile = UserProfile::new(public_id, platform_id, &display_name, self.clock.utc());
        index
            .accounts
            .insert(public_id, Arc::new(Mutex::new(Account::new(profile))));
        index.public_ids.insert(platform_id, public_id);
        drop(index);

        info!(
            platform_id = %platform_id,
            public_id = %public_id,
            display_name = %display_name,
            "registered new user"
        );
        Ok(public_id)
    }

    fn lookup_by_platform_id(&self, platform_id: PlatformId) -> Option<PublicId> {
        self.read_index().public_ids.get(&platform_id).copied()
    }

    fn profile(&self, public_id: PublicId) -> Option<UserProfile> {
        let handle = self.handle(public_id)?;
        let guard = lock(&handle);
        Some(guard.profile.clone())
    }

    fn touch_activity(&self, platform_id: PlatformId) {
        let handle = {
            let index = self.read_index();
            index
                .public_ids
                .get(&platform_id)
                .and_then(|id| index.accounts.get(id))
                .cloned()
        };
        if let Some(handle) = handle {
            let now = self.clock.utc();
            lock(&handle).profile.last_active_at = now;
        }
    }

    fn update_bio(&self, public_id: PublicId, bio: &str) -> Result<(), Error> {
        self.with_account(public_id, |account| {
            bio.clone_into(&mut account.profile.bio);
            Ok(())
        })
    }
}
