//! Session lifecycle controller.
//!
//! The controller is the only place sessions are created or torn down. It
//! holds its session lock across the whole disconnect-then-connect sequence,
//! so at most one transport is live at any time.

use crate::{ChatLog, ChatSession, ChatlayError, Result, SessionConfig};
use chatlay_types::{ChannelTarget, ConnectionState, ConnectionStatus};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

/// Drives connection state for one overlay instance.
pub struct SessionController {
    config: SessionConfig,
    log: Arc<ChatLog>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    session: Mutex<Option<ChatSession>>,
}

impl SessionController {
    /// Create a controller that feeds `log`. Nothing connects until
    /// [`set_channel`](Self::set_channel) is called.
    pub fn new(config: SessionConfig, log: Arc<ChatLog>) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::default());
        Self {
            config,
            log,
            status_tx: Arc::new(status_tx),
            session: Mutex::new(None),
        }
    }

    /// Connect to `name`, replacing any current connection.
    ///
    /// The name is normalized first; an empty name is rejected without side
    /// effects. Requesting the channel that is already connected still
    /// reconnects, which also clears the log.
    pub async fn set_channel(&self, name: &str) -> Result<ChannelTarget> {
        let target =
            ChannelTarget::parse(name).ok_or_else(|| ChatlayError::InvalidChannel(name.to_string()))?;

        let mut current = self.session.lock().await;
        if let Some(mut previous) = current.take() {
            info!(target: "chatlay::controller", "Switching from {} to {}", previous.channel(), target);
            previous.disconnect().await;
        }

        self.publish(
            ConnectionState::Connecting,
            Some(target.clone()),
            format!("Connecting to {}...", target),
        );

        match ChatSession::open(target.clone(), &self.config).await {
            Ok(mut session) => {
                self.log.clear();
                self.log.push_system(format!("Connected to {}", target));
                self.publish(
                    ConnectionState::Connected,
                    Some(target.clone()),
                    format!("Connected to {}", target),
                );
                session.start(self.log.clone(), self.status_tx.clone());
                *current = Some(session);
                Ok(target)
            }
            Err(e) => {
                warn!(target: "chatlay::controller", "Failed to connect to {}: {}", target, e);
                self.log.push_system(format!("Connection error: {}", e));
                self.publish(ConnectionState::Disconnected, Some(target), "Connection failed");
                Err(e)
            }
        }
    }

    /// Tear down the current connection, if any. Idempotent.
    pub async fn disconnect(&self) {
        let mut current = self.session.lock().await;
        if let Some(mut session) = current.take() {
            session.disconnect().await;
            self.publish(
                ConnectionState::Disconnected,
                Some(session.channel().clone()),
                "Disconnected",
            );
        }
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.status_tx.borrow().clone()
    }

    /// Watch connection status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Publish a status without changing the connection, e.g. a placeholder
    /// before any channel has been chosen.
    pub fn set_status_message(&self, message: impl Into<String>) {
        let status = self.status();
        self.publish(status.state, status.channel, message);
    }

    /// Most recently requested channel.
    pub fn channel(&self) -> Option<ChannelTarget> {
        self.status_tx.borrow().channel.clone()
    }

    pub fn log(&self) -> &Arc<ChatLog> {
        &self.log
    }

    fn publish(&self, state: ConnectionState, channel: Option<ChannelTarget>, message: impl Into<String>) {
        let status = ConnectionStatus::new(state, channel, message);
        info!(target: "chatlay::controller", "Status: {:?} - {}", status.state, status.message);
        self.status_tx.send_replace(status);
    }
}
