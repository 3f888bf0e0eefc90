//! Driving port for per-pair conversation ledgers.

use crate::domain::{ConversationPreview, Error, Message, PublicId};

#[cfg_attr(test, mockall::automock)]
pub trait Conversations: Send + Sync {
    /// Store a read copy for `sender` and an unread copy for `receiver`.
    /// Returns the sender's copy.
    fn append_message(
        &self,
        sender: PublicId,
        receiver: PublicId,
        text: &str,
    ) -> Result<Message, Error>;

    /// One preview per ledger, most recent first.
    fn list_conversations(&self, owner: PublicId) -> Result<Vec<ConversationPreview>, Error>;

    /// Full ledger with partner; marks every entry read.
    fn read_conversation(
        &self,
        owner: PublicId,
        partner: PublicId,
    ) -> Result<Vec<Message>, Error>;

    /// Drop `owner`'s ledger with `partner`. The partner's copy is untouched.
    fn delete_conversation(&self, owner: PublicId, partner: PublicId) -> Result<(), Error>;

    /// Set `owner`'s reaction on the newest message in the ledger and mirror
    /// the reaction list onto the partner's copy.
    fn react(&self, owner: PublicId, partner: PublicId, emoji: &str) -> Result<Message, Error>;
}
