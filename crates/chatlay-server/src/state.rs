//! Shared application state.

use crate::config::Config;
use chatlay_core::{ChatLog, SessionController};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub log: Arc<ChatLog>,
    pub controller: Arc<SessionController>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let log = Arc::new(ChatLog::new());
        let controller = Arc::new(SessionController::new(config.session_config(), log.clone()));

        Self {
            log,
            controller,
            config,
        }
    }
}
