//! Friend-request state machine and blocking.

use tracing::info;

use crate::domain::ports::{IdentityRegistry, PendingRequests, SocialGraph};
use crate::domain::{Error, Notification, NotificationKind, PublicId, Relation, UserProfile};

use super::SocialStore;

impl SocialStore {
    fn profiles_for(&self, ids: impl IntoIterator<Item = PublicId>) -> Vec<UserProfile> {
        ids.into_iter().filter_map(|id| self.profile(id)).collect()
    }
}

impl SocialGraph for SocialStore {
    fn send_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            if a.profile.blocks(target) {
                return Err(Error::blocked("you must unblock this user first"));
            }
            if t.profile.blocks(actor) {
                return Err(Error::blocked("you have been blocked by this user"));
            }
            if a.friends.contains(&target) {
                return Err(Error::invalid_state("you are already friends"));
            }
            if a.profile.sent_requests.contains(&target) {
                return Err(Error::invalid_state("a friend request is already pending"));
            }
            if a.profile.received_requests.contains(&target) {
                return Err(Error::invalid_state(
                    "this user has already sent you a friend request",
                ));
            }

            a.profile.sent_requests.insert(target);
            t.profile.received_requests.insert(actor);
            Ok(Notification::new(
                t.profile.platform_id,
                NotificationKind::FriendRequestReceived {
                    from: a.profile.display_name.clone(),
                },
            ))
        })?;

        info!(actor = %actor, target = %target, "friend request sent");
        self.notify(notification);
        Ok(())
    }

    fn accept_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            if !a.profile.received_requests.contains(&target) {
                return Err(Error::invalid_state("no pending request from this user"));
            }

            a.profile.received_requests.remove(&target);
            t.profile.sent_requests.remove(&actor);
            a.friends.insert(target);
            t.friends.insert(actor);
            Ok(Notification::new(
                t.profile.platform_id,
                NotificationKind::FriendRequestAccepted {
                    by: a.profile.display_name.clone(),
                },
            ))
        })?;

        info!(actor = %actor, target = %target, "friend request accepted");
        self.notify(notification);
        Ok(())
    }

    fn decline_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            if !a.profile.received_requests.remove(&target) {
                return Err(Error::invalid_state("no pending request from this user"));
            }
            t.profile.sent_requests.remove(&actor);
            Ok(Notification::new(
                t.profile.platform_id,
                NotificationKind::FriendRequestDeclined {
                    by: a.profile.display_name.clone(),
                },
            ))
        })?;

        info!(actor = %actor, target = %target, "friend request declined");
        self.notify(notification);
        Ok(())
    }

    fn cancel_request(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            if !a.profile.sent_requests.remove(&target) {
                return Err(Error::invalid_state("no pending request to this user"));
            }
            t.profile.received_requests.remove(&actor);
            Ok(Notification::new(
                t.profile.platform_id,
                NotificationKind::FriendRequestCancelled {
                    by: a.profile.display_name.clone(),
                },
            ))
        })?;

        info!(actor = %actor, target = %target, "friend request cancelled");
        self.notify(notification);
        Ok(())
    }

    fn unfriend(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            let ours = a.friends.remove(&target);
            let theirs = t.friends.remove(&actor);
            Ok((ours || theirs).then(|| {
                Notification::new(
                    t.profile.platform_id,
                    NotificationKind::FriendshipEnded {
                        by: a.profile.display_name.clone(),
                    },
                )
            }))
        })?;

        // Repeating an unfriend changes nothing and stays silent.
        if let Some(notification) = notification {
            info!(actor = %actor, target = %target, "friendship removed");
            self.notify(notification);
        }
        Ok(())
    }

    fn block(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            let newly_blocked = a.profile.blocked.insert(target);
            a.friends.remove(&target);
            t.friends.remove(&actor);
            a.profile.sent_requests.remove(&target);
            a.profile.received_requests.remove(&target);
            t.profile.sent_requests.remove(&actor);
            t.profile.received_requests.remove(&actor);
            Ok(newly_blocked.then(|| {
                Notification::new(
                    t.profile.platform_id,
                    NotificationKind::BlockedBy {
                        by: a.profile.display_name.clone(),
                    },
                )
            }))
        })?;

        if let Some(notification) = notification {
            info!(actor = %actor, target = %target, "user blocked");
            self.notify(notification);
        }
        Ok(())
    }

    fn unblock(&self, actor: PublicId, target: PublicId) -> Result<(), Error> {
        let notification = self.with_pair(actor, target, |a, t| {
            Ok(a.profile.blocked.remove(&target).then(|| {
                Notification::new(
                    t.profile.platform_id,
                    NotificationKind::UnblockedBy {
                        by: a.profile.display_name.clone(),
                    },
                )
            }))
        })?;

        if let Some(notification) = notification {
            info!(actor = %actor, target = %target, "user unblocked");
            self.notify(notification);
        }
        Ok(())
    }

    fn relation_to(&self, viewer: PublicId, target: PublicId) -> Result<Relation, Error> {
        if viewer == target {
            return self.with_account(viewer, |_| Ok(Relation::self_view()));
        }
        if self.handle(target).is_none() {
            return Err(Error::not_found("user not found"));
        }
        self.with_account(viewer, |v| {
            Ok(Relation {
                is_self: false,
                is_friend: v.friends.contains(&target),
                is_blocked_by_viewer: v.profile.blocks(target),
                has_sent_pending_request: v.profile.sent_requests.contains(&target),
                has_received_pending_request: v.profile.received_requests.contains(&target),
            })
        })
    }

    fn friends_of(&self, owner: PublicId) -> Result<Vec<UserProfile>, Error> {
        let ids = self.with_account(owner, |account| Ok(account.friends.clone()))?;
        Ok(self.profiles_for(ids))
    }

    fn pending_requests(&self, owner: PublicId) -> Result<PendingRequests, Error> {
        let (received, sent) = self.with_account(owner, |account| {
            Ok((
                account.profile.received_requests.clone(),
                account.profile.sent_requests.clone(),
            ))
        })?;
        Ok(PendingRequests {
            received: self.profiles_for(received),
            sent: self.profiles_for(sent),
        })
    }
}
