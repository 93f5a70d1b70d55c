//! Integration tests for the `/ws/events` overlay stream.
//!
//! The router is served on a real localhost port and a WebSocket client
//! watches what an overlay would see while the test mutates the shared state.

use axum::Router;
use chatlay_server::{config::Config, routes, state::AppState};
use chatlay_types::{ConnectionState, EntryKind, LogChange, OverlayEvent, WsServerMessage};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn serve_test_app() -> (SocketAddr, Arc<AppState>) {
    let config = Config {
        port: 0,
        chat_host: "127.0.0.1".to_string(),
        connect_timeout_secs: 2,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config));
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .nest("/ws", routes::ws_routes())
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{}/ws/events", addr)).await.unwrap();
    ws
}

/// Next server message, skipping control frames.
async fn next_message(ws: &mut Client) -> WsServerMessage {
    loop {
        let msg = tokio::time::timeout(TEST_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn next_log_change(ws: &mut Client) -> LogChange {
    match next_message(ws).await {
        WsServerMessage::Event { event: OverlayEvent::Log(change) } => change,
        other => panic!("Expected log event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_snapshot_carries_existing_state() {
    let (addr, state) = serve_test_app().await;
    state.log.push_system("Waiting for you to set a Twitch channel...");
    state.controller.set_status_message("No channel configured");

    let mut ws = connect(addr).await;
    match next_message(&mut ws).await {
        WsServerMessage::Snapshot { messages, status } => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].kind, EntryKind::SystemNotice);
            assert_eq!(status.state, ConnectionState::Disconnected);
            assert_eq!(status.message, "No channel configured");
        }
        other => panic!("Expected snapshot, got {:?}", other),
    }
}

#[tokio::test]
async fn test_events_follow_mutation_order() {
    let (addr, state) = serve_test_app().await;
    let mut ws = connect(addr).await;
    assert!(matches!(next_message(&mut ws).await, WsServerMessage::Snapshot { .. }));

    state.log.push_user("alice", "one");
    state.log.push_user("bob", "two");
    state.log.clear();

    match next_log_change(&mut ws).await {
        LogChange::Appended { entry, evicted } => {
            assert_eq!((entry.author.as_str(), entry.body.as_str()), ("alice", "one"));
            assert!(!evicted);
        }
        other => panic!("Expected append, got {:?}", other),
    }
    assert!(matches!(
        next_log_change(&mut ws).await,
        LogChange::Appended { entry, .. } if entry.body == "two"
    ));
    assert_eq!(next_log_change(&mut ws).await, LogChange::Cleared);

    state.controller.set_status_message("Reconnecting soon");
    match next_message(&mut ws).await {
        WsServerMessage::Event { event: OverlayEvent::Status(status) } => {
            assert_eq!(status.message, "Reconnecting soon");
        }
        other => panic!("Expected status event, got {:?}", other),
    }

    state.log.push_user("carol", "three");
    assert!(matches!(
        next_log_change(&mut ws).await,
        LogChange::Appended { entry, .. } if entry.body == "three"
    ));
}

#[tokio::test]
async fn test_slow_client_is_told_it_lagged() {
    let (addr, state) = serve_test_app().await;
    let mut ws = connect(addr).await;
    assert!(matches!(next_message(&mut ws).await, WsServerMessage::Snapshot { .. }));

    // The current-thread runtime cannot run the forwarding task until we
    // await, so every change lands in the subscriber's queue first.
    for i in 0..300 {
        state.log.push_user("spammer", i.to_string());
    }

    match next_message(&mut ws).await {
        WsServerMessage::Lagged { skipped } => assert_eq!(skipped, 44),
        other => panic!("Expected lagged notice, got {:?}", other),
    }
    assert!(matches!(
        next_log_change(&mut ws).await,
        LogChange::Appended { entry, .. } if entry.body == "44"
    ));
}

#[tokio::test]
async fn test_clients_receive_the_same_stream() {
    let (addr, state) = serve_test_app().await;
    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    next_message(&mut first).await;
    next_message(&mut second).await;

    state.log.push_user("alice", "hello");

    for ws in [&mut first, &mut second] {
        assert!(matches!(
            next_log_change(ws).await,
            LogChange::Appended { entry, .. } if entry.body == "hello"
        ));
    }
}
