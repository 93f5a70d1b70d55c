//! Common test utilities for integration tests.

#![allow(dead_code)]

use chatlay_core::SessionConfig;
use chatlay_types::{ConnectionState, ConnectionStatus};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

/// Upper bound for anything a test waits on.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A stand-in for the chat service listening on localhost.
pub struct FakeIrcServer {
    listener: TcpListener,
}

impl FakeIrcServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    pub fn addr(&self) -> SocketAddr {
        self.listener.local_addr().unwrap()
    }

    /// Session settings pointing at this server.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: "127.0.0.1".to_string(),
            port: self.addr().port(),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Accept the next client and consume its NICK/JOIN login.
    pub async fn accept(&self) -> FakeClient {
        let (stream, _) = tokio::time::timeout(TEST_TIMEOUT, self.listener.accept())
            .await
            .expect("timed out waiting for client")
            .unwrap();
        let mut client = FakeClient::new(stream);
        client.login = (client.read_line().await, client.read_line().await);
        client
    }
}

/// Server side of one accepted connection.
pub struct FakeClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    /// The identity and join lines sent by the client.
    pub login: (Option<String>, Option<String>),
}

impl FakeClient {
    fn new(stream: TcpStream) -> Self {
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
            login: (None, None),
        }
    }

    /// Next line from the client, `None` once it closed the connection.
    pub async fn read_line(&mut self) -> Option<String> {
        tokio::time::timeout(TEST_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for client line")
            .ok()
            .flatten()
    }

    pub async fn send(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await
    }

    /// Write bytes as-is, without a terminator.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    pub async fn send_chat(&mut self, user: &str, channel: &str, text: &str) {
        let line = format!(":{user}!{user}@{user}.tmi.twitch.tv PRIVMSG #{channel} :{text}");
        self.send(&line).await.unwrap();
    }

    /// Send a keep-alive and wait for the reply. Everything sent before it has
    /// been processed by the client once this returns.
    pub async fn sync(&mut self) -> Option<String> {
        self.send("PING :tmi.twitch.tv").await.unwrap();
        self.read_line().await
    }
}

/// Wait until the published status reaches `state`.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<ConnectionStatus>,
    state: ConnectionState,
) -> ConnectionStatus {
    tokio::time::timeout(TEST_TIMEOUT, rx.wait_for(|s| s.state == state))
        .await
        .expect("timed out waiting for state")
        .expect("status channel closed")
        .clone()
}
