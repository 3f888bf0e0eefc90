//! In-memory social graph and conversation store.
//!
//! Each identity's [`Account`] sits behind its own mutex. An index behind a
//! reader/writer lock maps ids to account handles and is only held long
//! enough to clone a handle or register a new account.
//!
//! Locking rules:
//! - The index lock is never acquired while an account lock is held.
//! - Operations touching two accounts lock them in ascending public id order.
//! - Notifications are published after every account guard is dropped.

mod conversations;
mod graph;
mod integrity;
mod registry;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mockable::Clock;
use tracing::warn;

use crate::domain::ports::{NotificationSink, PublicIdSource};
use crate::domain::{Account, Error, Notification, PlatformId, PublicId, StoreSnapshot};

pub use self::integrity::IntegrityViolation;

type AccountHandle = Arc<Mutex<Account>>;

#[derive(Default)]
struct Index {
    accounts: HashMap<PublicId, AccountHandle>,
    public_ids: HashMap<PlatformId, PublicId>,
}

/// Owner of every profile, friend set, and conversation ledger.
///
/// Implements the [`IdentityRegistry`](crate::domain::ports::IdentityRegistry),
/// [`SocialGraph`](crate::domain::ports::SocialGraph) and
/// [`Conversations`](crate::domain::ports::Conversations) ports.
pub struct SocialStore {
    index: RwLock<Index>,
    ids: Arc<dyn PublicIdSource>,
    clock: Arc<dyn Clock>,
    notifications: Arc<dyn NotificationSink>,
}

impl SocialStore {
    pub fn new(
        ids: Arc<dyn PublicIdSource>,
        clock: Arc<dyn Clock>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::from_snapshot(StoreSnapshot::default(), ids, clock, notifications)
    }

    /// Build a store from previously persisted accounts.
    ///
    /// When two accounts claim the same public id or platform id the first
    /// one wins and the rest are dropped with a warning.
    pub fn from_snapshot(
        snapshot: StoreSnapshot,
        ids: Arc<dyn PublicIdSource>,
        clock: Arc<dyn Clock>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let mut index = Index::default();
        for account in snapshot.accounts {
            let public_id = account.public_id();
            let platform_id = account.profile.platform_id;
            if index.accounts.contains_key(&public_id)
                || index.public_ids.contains_key(&platform_id)
            {
                warn!(
                    public_id = %public_id,
                    platform_id = %platform_id,
                    "duplicate account in snapshot; keeping the first"
                );
                continue;
            }
            index.public_ids.insert(platform_id, public_id);
            index
                .accounts
                .insert(public_id, Arc::new(Mutex::new(account)));
        }

        Self {
            index: RwLock::new(index),
            ids,
            clock,
            notifications,
        }
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.read_index().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone every account into a consistent snapshot.
    ///
    /// All account locks are held together, taken in ascending order, so no
    /// pair operation is observed half-applied.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut handles: Vec<(PublicId, AccountHandle)> = self
            .read_index()
            .accounts
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect();
        handles.sort_by_key(|(id, _)| *id);

        let guards: Vec<MutexGuard<'_, Account>> =
            handles.iter().map(|(_, handle)| lock(handle)).collect();
        StoreSnapshot {
            accounts: guards.iter().map(|guard| (**guard).clone()).collect(),
        }
    }

    fn read_index(&self) -> RwLockReadGuard<'_, Index> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, Index> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, id: PublicId) -> Option<AccountHandle> {
        self.read_index().accounts.get(&id).cloned()
    }

    fn require(&self, id: PublicId) -> Result<AccountHandle, Error> {
        self.handle(id)
            .ok_or_else(|| Error::not_found("your profile could not be found"))
    }

    fn handles_for_pair(
        &self,
        actor: PublicId,
        target: PublicId,
    ) -> Result<(AccountHandle, AccountHandle), Error> {
        if actor == target {
            return Err(Error::forbidden("you cannot target yourself"));
        }
        let index = self.read_index();
        let actor_handle = index
            .accounts
            .get(&actor)
            .cloned()
            .ok_or_else(|| Error::not_found("your profile could not be found"))?;
        let target_handle = index
            .accounts
            .get(&target)
            .cloned()
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok((actor_handle, target_handle))
    }

    /// Run `apply` with both accounts locked in canonical order.
    fn with_pair<R>(
        &self,
        actor: PublicId,
        target: PublicId,
        apply: impl FnOnce(&mut Account, &mut Account) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let (actor_handle, target_handle) = self.handles_for_pair(actor, target)?;
        let (mut actor_guard, mut target_guard) = if actor < target {
            let a = lock(&actor_handle);
            let t = lock(&target_handle);
            (a, t)
        } else {
            let t = lock(&target_handle);
            let a = lock(&actor_handle);
            (a, t)
        };
        apply(&mut actor_guard, &mut target_guard)
    }

    /// Run `apply` with a single account locked.
    fn with_account<R>(
        &self,
        owner: PublicId,
        apply: impl FnOnce(&mut Account) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let handle = self.require(owner)?;
        let mut guard = lock(&handle);
        apply(&mut guard)
    }

    fn notify(&self, notification: Notification) {
        self.notifications.publish(notification);
    }
}

fn lock(handle: &AccountHandle) -> MutexGuard<'_, Account> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
