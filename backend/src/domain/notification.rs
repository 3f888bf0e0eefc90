//! Outbound notifications and their MarkdownV2 rendering.

use super::identity::PlatformId;

/// Event worth a push message to the counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    FriendRequestReceived { from: String },
    FriendRequestAccepted { by: String },
    FriendRequestDeclined { by: String },
    FriendRequestCancelled { by: String },
    FriendshipEnded { by: String },
    BlockedBy { by: String },
    UnblockedBy { by: String },
    NewMessage { from: String },
}

/// A notification addressed to a platform identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: PlatformId,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(recipient: PlatformId, kind: NotificationKind) -> Self {
        Self { recipient, kind }
    }

    /// Render the message body in the platform's MarkdownV2 dialect.
    ///
    /// # Examples
    /// ```
    /// use companion::domain::{Notification, NotificationKind, PlatformId};
    ///
    /// let note = Notification::new(
    ///     PlatformId::new(1),
    ///     NotificationKind::NewMessage { from: "ada_l".into() },
    /// );
    /// assert_eq!(note.render(), "📩 You have a new message from *ada\\_l*\\!");
    /// ```
    pub fn render(&self) -> String {
        match &self.kind {
            NotificationKind::FriendRequestReceived { from } => {
                format!("🤝 You have a friend request from *{}*\\!", escape_markdown(from))
            }
            NotificationKind::FriendRequestAccepted { by } => {
                format!("🎉 *{}* accepted your friend request\\!", escape_markdown(by))
            }
            NotificationKind::FriendRequestDeclined { by } => {
                format!("🙅 *{}* declined your friend request\\.", escape_markdown(by))
            }
            NotificationKind::FriendRequestCancelled { by } => {
                format!("↩️ *{}* withdrew their friend request\\.", escape_markdown(by))
            }
            NotificationKind::FriendshipEnded { by } => {
                format!("💔 *{}* removed you from their friends\\.", escape_markdown(by))
            }
            NotificationKind::BlockedBy { by } => {
                format!("🚫 *{}* has blocked you\\.", escape_markdown(by))
            }
            NotificationKind::UnblockedBy { by } => {
                format!("🔓 *{}* has unblocked you\\.", escape_markdown(by))
            }
            NotificationKind::NewMessage { from } => {
                format!("📩 You have a new message from *{}*\\!", escape_markdown(from))
            }
        }
    }
}

const MARKDOWN_V2_RESERVED: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape every MarkdownV2 reserved character in user-provided text.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
