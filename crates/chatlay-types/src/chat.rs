//! Chat log entries and change notifications.
//!
//! Entries are what the presentation layer renders: either a message posted by
//! a chat user or a notice generated locally (connected, disconnected, errors).

use serde::{Deserialize, Serialize};

/// Author name attached to locally generated notices.
pub const SYSTEM_AUTHOR: &str = "System";

/// What produced a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A message posted in the channel by a chat user.
    UserMessage,
    /// A status notice generated by the overlay itself.
    SystemNotice,
}

/// A single line in the chat log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Display name of the sender (`System` for notices).
    pub author: String,
    /// Message text.
    pub body: String,
    pub kind: EntryKind,
}

impl ChatEntry {
    /// Create an entry for a message posted by a chat user.
    pub fn user(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            kind: EntryKind::UserMessage,
        }
    }

    /// Create a locally generated notice.
    pub fn system(body: impl Into<String>) -> Self {
        Self {
            author: SYSTEM_AUTHOR.to_string(),
            body: body.into(),
            kind: EntryKind::SystemNotice,
        }
    }

    pub fn is_system(&self) -> bool {
        self.kind == EntryKind::SystemNotice
    }
}

/// A mutation of the chat log, published to observers in mutation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum LogChange {
    /// An entry was added at the tail.
    Appended {
        entry: ChatEntry,
        /// Whether the oldest entry was dropped to stay within capacity.
        evicted: bool,
    },
    /// All entries were removed.
    Cleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_entry() {
        let entry = ChatEntry::system("Connected to #foo");
        assert_eq!(entry.author, "System");
        assert_eq!(entry.kind, EntryKind::SystemNotice);
        assert!(entry.is_system());
    }

    #[test]
    fn test_user_entry() {
        let entry = ChatEntry::user("alice", "hello world");
        assert_eq!(entry.author, "alice");
        assert_eq!(entry.body, "hello world");
        assert!(!entry.is_system());
    }

    #[test]
    fn test_log_change_serialization() {
        let change = LogChange::Appended {
            entry: ChatEntry::user("alice", "hi"),
            evicted: false,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["change"], "appended");
        assert_eq!(json["entry"]["kind"], "user_message");
        assert_eq!(json["evicted"], false);

        let json = serde_json::to_value(LogChange::Cleared).unwrap();
        assert_eq!(json["change"], "cleared");
    }
}
