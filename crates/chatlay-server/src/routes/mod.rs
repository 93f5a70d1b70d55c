//! HTTP route handlers.

pub mod channel;
pub mod messages;
pub mod ws;

use crate::state::AppState;
use axum::{
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/messages", get(messages::list))
        .route("/status", get(channel::status))
        .route("/channel", put(channel::set).delete(channel::disconnect))
        .route("/health", get(health))
}

/// Routes mounted under `/ws`.
pub fn ws_routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(ws::upgrade))
}
