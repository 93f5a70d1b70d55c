//! WebSocket route handler.

use crate::state::AppState;
use crate::websocket::handle_events_websocket;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};
use std::sync::Arc;

pub async fn upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_events_websocket(socket, state).await {
            tracing::error!(target: "chatlay::ws", "Events WebSocket error: {}", e);
        }
    })
}
