//! Chat log routes.

use crate::state::AppState;
use axum::{extract::State, Json};
use chatlay_core::MAX_CAPACITY;
use chatlay_types::ChatEntry;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<ChatEntry>,
    pub capacity: usize,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Json<MessageListResponse> {
    Json(MessageListResponse {
        messages: state.log.snapshot(),
        capacity: MAX_CAPACITY,
    })
}
