//! Chatlay server library - HTTP/WebSocket bridge between the chat core and
//! an overlay front end.
//!
//! Routes, WebSocket handling and application state live here so they can be
//! exercised by integration tests; `main.rs` only wires them up.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
pub mod websocket;
