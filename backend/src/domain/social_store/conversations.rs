//! Dual-sided conversation ledgers.

use tracing::{debug, info};

use crate::domain::ports::{Conversations, IdentityRegistry};
use crate::domain::{
    ConversationPreview, Error, Message, MessageId, Notification, NotificationKind, PublicId,
};

use super::SocialStore;

const UNKNOWN_PARTNER: &str = "Unknown";

impl Conversations for SocialStore {
    fn append_message(
        &self,
        sender: PublicId,
        receiver: PublicId,
        text: &str,
    ) -> Result<Message, Error> {
        let (message, notification) = self.with_pair(sender, receiver, |s, r| {
            if r.profile.blocks(sender) {
                return Err(Error::blocked("you have been blocked by this user"));
            }
            if s.profile.blocks(receiver) {
                return Err(Error::blocked("you must unblock this user first"));
            }

            // Stamped under the pair lock so ledger order follows time order.
            let message = Message {
                id: Some(MessageId::generate()),
                sender_id: sender,
                receiver_id: receiver,
                text: text.to_owned(),
                timestamp: self.clock.utc(),
                unread: false,
                reactions: Vec::new(),
            };
            s.ledgers.entry(receiver).or_default().push(message.clone());
            r.ledgers.entry(sender).or_default().push(Message {
                unread: true,
                ..message.clone()
            });

            let notification = Notification::new(
                r.profile.platform_id,
                NotificationKind::NewMessage {
                    from: s.profile.display_name.clone(),
                },
            );
            Ok((message, notification))
        })?;

        debug!(sender = %sender, receiver = %receiver, "message stored");
        self.notify(notification);
        Ok(message)
    }

    fn list_conversations(&self, owner: PublicId) -> Result<Vec<ConversationPreview>, Error> {
        let rows = self.with_account(owner, |account| {
            Ok(account
                .ledgers
                .iter()
                .map(|(partner, ledger)| {
                    let last = ledger.last();
                    (
                        *partner,
                        last.map(|m| m.text.clone()),
                        last.map(|m| m.timestamp),
                        ledger.iter().filter(|m| m.unread).count(),
                    )
                })
                .collect::<Vec<_>>())
        })?;

        let mut previews: Vec<ConversationPreview> = rows
            .into_iter()
            .map(
                |(partner_id, last_text, last_timestamp, unread_count)| ConversationPreview {
                    partner_id,
                    partner_name: self
                        .profile(partner_id)
                        .map_or_else(|| UNKNOWN_PARTNER.to_owned(), |p| p.display_name),
                    last_text,
                    last_timestamp,
                    unread_count,
                },
            )
            .collect();
        // `None < Some`, so empty ledgers end up last.
        previews.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
        Ok(previews)
    }

    fn read_conversation(
        &self,
        owner: PublicId,
        partner: PublicId,
    ) -> Result<Vec<Message>, Error> {
        self.with_account(owner, |account| {
            let Some(ledger) = account.ledgers.get_mut(&partner) else {
                return Ok(Vec::new());
            };
            for message in ledger.iter_mut() {
                message.unread = false;
            }
            Ok(ledger.clone())
        })
    }

    fn delete_conversation(&self, owner: PublicId, partner: PublicId) -> Result<(), Error> {
        self.with_account(owner, |account| {
            account
                .ledgers
                .remove(&partner)
                .map(|_| ())
                .ok_or_else(|| Error::not_found("chat history not found"))
        })?;
        info!(owner = %owner, partner = %partner, "conversation deleted");
        Ok(())
    }

    fn react(&self, owner: PublicId, partner: PublicId, emoji: &str) -> Result<Message, Error> {
        self.with_pair(owner, partner, |o, p| {
            let Some(latest) = o
                .ledgers
                .get_mut(&partner)
                .and_then(|ledger| ledger.last_mut())
            else {
                return Err(Error::not_found("chat history not found"));
            };
            latest.set_reaction(owner, emoji);
            let updated = latest.clone();

            let mirror = p
                .ledgers
                .get_mut(&owner)
                .and_then(|ledger| ledger.iter_mut().rev().find(|m| m.is_copy_of(&updated)));
            match mirror {
                Some(copy) => copy.reactions.clone_from(&updated.reactions),
                None => debug!(
                    owner = %owner,
                    partner = %partner,
                    "partner copy not found; reaction not mirrored"
                ),
            }
            Ok(updated)
        })
    }
}
