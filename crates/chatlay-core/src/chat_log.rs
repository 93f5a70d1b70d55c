//! Bounded chat log shared between the receive loop and the controller.

use chatlay_types::{ChatEntry, LogChange};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::trace;

/// Maximum number of entries kept; older entries are evicted first.
pub const MAX_CAPACITY: usize = 100;

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Ordered, capacity-limited sequence of chat entries.
///
/// Every mutation takes the same lock and publishes its [`LogChange`] while
/// still holding it, so subscribers see changes in exactly the order they
/// were applied.
pub struct ChatLog {
    entries: Mutex<VecDeque<ChatEntry>>,
    change_tx: broadcast::Sender<LogChange>,
}

impl ChatLog {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(MAX_CAPACITY + 1)),
            change_tx,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LogChange> {
        self.change_tx.subscribe()
    }

    /// Append an entry at the tail, evicting the oldest entry when over capacity.
    pub fn append(&self, entry: ChatEntry) {
        let mut entries = self.lock();
        entries.push_back(entry.clone());

        let evicted = entries.len() > MAX_CAPACITY;
        if evicted {
            entries.pop_front();
        }

        trace!(target: "chatlay::log", "Appended entry from {} ({} entries)", entry.author, entries.len());
        // No subscribers is fine
        let _ = self.change_tx.send(LogChange::Appended { entry, evicted });
    }

    /// Append a locally generated notice.
    pub fn push_system(&self, body: impl Into<String>) {
        self.append(ChatEntry::system(body));
    }

    /// Append a message posted by a chat user.
    pub fn push_user(&self, author: impl Into<String>, body: impl Into<String>) {
        self.append(ChatEntry::user(author, body));
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        trace!(target: "chatlay::log", "Cleared chat log");
        let _ = self.change_tx.send(LogChange::Cleared);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<ChatEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ChatEntry>> {
        // No critical section can leave the deque half-mutated
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}
