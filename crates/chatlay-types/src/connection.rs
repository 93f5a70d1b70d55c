//! Connection state published to the presentation layer.

use crate::ChannelTarget;
use serde::{Deserialize, Serialize};

/// Externally visible state of the chat connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// A connection state together with the status text to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Channel the state refers to, if any has been requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelTarget>,
    /// Human-readable status line (e.g. "Connected to #foo").
    pub message: String,
}

impl ConnectionStatus {
    pub fn new(
        state: ConnectionState,
        channel: Option<ChannelTarget>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            state,
            channel,
            message: message.into(),
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected, None, "No channel configured")
    }
}
