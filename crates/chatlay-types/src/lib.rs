//! Shared types for the Chatlay chat overlay.

mod channel;
mod chat;
mod connection;
mod ws;

pub use channel::*;
pub use chat::*;
pub use connection::*;
pub use ws::*;
