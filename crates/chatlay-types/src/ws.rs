//! WebSocket message protocol between the overlay server and its clients.

use serde::{Deserialize, Serialize};

use crate::{ChatEntry, ConnectionStatus, LogChange};

/// Events observed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// The chat log changed.
    Log(LogChange),
    /// The connection state or status text changed.
    Status(ConnectionStatus),
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// Full state, sent once right after the client connects.
    Snapshot {
        messages: Vec<ChatEntry>,
        status: ConnectionStatus,
    },
    /// Incremental update.
    Event { event: OverlayEvent },
    /// The client fell behind and missed `skipped` events; it should refetch.
    Lagged { skipped: u64 },
}
