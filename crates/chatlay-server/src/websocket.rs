//! Event stream for overlay clients.
//!
//! Each client gets a snapshot of the chat log and connection status, then
//! every log change and status change as it happens.

use crate::state::AppState;
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use chatlay_types::{OverlayEvent, WsServerMessage};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, trace};

pub async fn handle_events_websocket(socket: WebSocket, state: Arc<AppState>) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Subscribe before taking the snapshot so nothing falls in between
    let mut log_rx = state.log.subscribe();
    let mut status_rx = state.controller.subscribe_status();

    let snapshot = WsServerMessage::Snapshot {
        messages: state.log.snapshot(),
        status: status_rx.borrow_and_update().clone(),
    };
    ws_tx
        .send(Message::Text(serde_json::to_string(&snapshot)?.into()))
        .await?;

    info!(target: "chatlay::ws", "Overlay client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                change = log_rx.recv() => match change {
                    Ok(change) => WsServerMessage::Event { event: OverlayEvent::Log(change) },
                    Err(RecvError::Lagged(skipped)) => WsServerMessage::Lagged { skipped },
                    Err(RecvError::Closed) => break,
                },
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = status_rx.borrow_and_update().clone();
                    WsServerMessage::Event { event: OverlayEvent::Status(status) }
                }
            };

            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                debug!(target: "chatlay::ws", "Overlay client went away");
                break;
            }
        }
    });

    // Clients only send keepalives; watch for close
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Ping(_) => {
                    trace!(target: "chatlay::ws", "Received ping from overlay client");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(target: "chatlay::ws", "Overlay client disconnected");
    Ok(())
}
