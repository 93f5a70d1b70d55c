//! Channel selection and connection status routes.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use chatlay_core::ChatlayError;
use chatlay_types::{ChannelTarget, ConnectionStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Deserialize)]
pub struct SetChannelRequest {
    pub channel: String,
}

#[derive(Serialize)]
pub struct SetChannelResponse {
    pub channel: ChannelTarget,
    pub status: ConnectionStatus,
}

/// Connect to a channel, replacing the current connection.
pub async fn set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetChannelRequest>,
) -> Result<Json<SetChannelResponse>, (StatusCode, String)> {
    info!(target: "chatlay::api", "Channel requested: {:?}", req.channel);

    match state.controller.set_channel(&req.channel).await {
        Ok(channel) => Ok(Json(SetChannelResponse {
            channel,
            status: state.controller.status(),
        })),
        Err(e) => {
            warn!(target: "chatlay::api", "Failed to set channel {:?}: {}", req.channel, e);
            Err((error_status(&e), e.to_string()))
        }
    }
}

/// Drop the current connection.
pub async fn disconnect(State(state): State<Arc<AppState>>) -> StatusCode {
    info!(target: "chatlay::api", "Disconnect requested");
    state.controller.disconnect().await;
    StatusCode::NO_CONTENT
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<ConnectionStatus> {
    Json(state.controller.status())
}

fn error_status(err: &ChatlayError) -> StatusCode {
    match err {
        ChatlayError::InvalidChannel(_) => StatusCode::BAD_REQUEST,
        ChatlayError::TransportConnect(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
