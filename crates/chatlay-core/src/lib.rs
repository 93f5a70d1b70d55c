//! Chat ingestion core for Chatlay: protocol codec, session, chat log and
//! the lifecycle controller that ties them together.

mod chat_log;
mod codec;
mod controller;
mod error;
mod identity;
mod session;

pub use chat_log::{ChatLog, MAX_CAPACITY};
pub use codec::{classify, identity_line, join_line, ProtocolEvent, KEEPALIVE_REPLY};
pub use controller::SessionController;
pub use error::ChatlayError;
pub use identity::generate_anonymous_identity;
pub use session::{ChatSession, SessionConfig, SessionState, MAX_LINE_BYTES};

/// Result type for Chatlay operations.
pub type Result<T> = std::result::Result<T, ChatlayError>;
