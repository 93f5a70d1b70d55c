//! Chat session owning one connection to the chat service.
//!
//! A session goes `Idle -> Connecting -> Active -> Closed` exactly once.
//! [`ChatSession::open`] connects and logs in, [`ChatSession::start`] spawns
//! the receive loop, [`ChatSession::disconnect`] tears everything down.
//! Switching channels means building a new session.

use crate::codec::{classify, identity_line, join_line, ProtocolEvent, KEEPALIVE_REPLY};
use crate::{generate_anonymous_identity, ChatLog, ChatlayError, Result};
use chatlay_types::{ChannelTarget, ConnectionState, ConnectionStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// How long `disconnect` waits for the receive loop before aborting it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Longest accepted protocol line in bytes, terminator included.
/// Twitch caps its own lines well below this.
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// Connection settings for the chat service.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "irc.chat.twitch.tv".to_string(),
            port: 6667,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Lifecycle of a single session instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    /// Terminal; a closed session is never reopened.
    Closed,
}

struct Transport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    /// Reused between reads.
    line_buf: Vec<u8>,
}

/// Result of reading one raw line off the wire.
#[derive(Debug, PartialEq, Eq)]
enum RawLine {
    Line(String),
    /// Longer than [`MAX_LINE_BYTES`]; its bytes were consumed and discarded.
    Oversized(usize),
    Eof,
}

impl Transport {
    fn new(read_half: OwnedReadHalf, writer: OwnedWriteHalf) -> Self {
        Self {
            reader: BufReader::new(read_half),
            writer,
            line_buf: Vec::with_capacity(512),
        }
    }

    async fn read_line(&mut self) -> std::io::Result<RawLine> {
        read_bounded_line(&mut self.reader, &mut self.line_buf, MAX_LINE_BYTES).await
    }
}

/// Read up to the next `\n`, keeping at most `max` bytes.
///
/// Bytes that are not UTF-8 are replaced rather than rejected, so a single
/// garbled line cannot end the session. A partial line at end of stream is
/// dropped. Not cancel safe: a cancelled read loses the partial line.
async fn read_bounded_line<R>(reader: &mut R, buf: &mut Vec<u8>, max: usize) -> std::io::Result<RawLine>
where
    R: AsyncBufReadExt + Unpin,
{
    buf.clear();
    let mut total = 0usize;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(RawLine::Eof);
        }

        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        total += used;
        if total <= max {
            buf.extend_from_slice(&available[..used]);
        } else {
            buf.clear();
        }
        reader.consume(used);

        if done {
            if total > max {
                return Ok(RawLine::Oversized(total));
            }
            let line = String::from_utf8_lossy(&buf[..]);
            return Ok(RawLine::Line(line.trim_end_matches(['\r', '\n']).to_string()));
        }
    }
}

/// One connection to one channel.
pub struct ChatSession {
    channel: ChannelTarget,
    nick: String,
    state: Arc<watch::Sender<SessionState>>,
    /// Present between `open` and `start`; moved into the receive loop afterwards.
    transport: Option<Transport>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ChatSession {
    /// Connect to the chat service and send the login/join sequence.
    ///
    /// No acknowledgement is awaited: the session is `Active` as soon as both
    /// lines have been written.
    pub async fn open(channel: ChannelTarget, config: &SessionConfig) -> Result<Self> {
        let (state, _) = watch::channel(SessionState::Idle);
        let state = Arc::new(state);
        state.send_replace(SessionState::Connecting);

        info!(
            target: "chatlay::session",
            "Connecting to {}:{} for {}",
            config.host, config.port, channel
        );

        let connect = TcpStream::connect((config.host.as_str(), config.port));
        let stream = match tokio::time::timeout(config.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                state.send_replace(SessionState::Closed);
                return Err(ChatlayError::TransportConnect(e.to_string()));
            }
            Err(_) => {
                state.send_replace(SessionState::Closed);
                return Err(ChatlayError::TransportConnect(format!(
                    "timed out after {}s connecting to {}:{}",
                    config.connect_timeout.as_secs(),
                    config.host,
                    config.port
                )));
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!(target: "chatlay::session", "Failed to set TCP_NODELAY: {}", e);
        }

        let (read_half, mut writer) = stream.into_split();
        let nick = generate_anonymous_identity();

        let login = async {
            send_line(&mut writer, &identity_line(&nick)).await?;
            send_line(&mut writer, &join_line(channel.as_str())).await
        };
        if let Err(e) = login.await {
            state.send_replace(SessionState::Closed);
            let _ = writer.shutdown().await;
            return Err(ChatlayError::TransportConnect(e.to_string()));
        }

        state.send_replace(SessionState::Active);
        info!(target: "chatlay::session", "Joined {} as {}", channel, nick);

        Ok(Self {
            channel,
            nick,
            state,
            transport: Some(Transport::new(read_half, writer)),
            cancel: CancellationToken::new(),
            task: None,
        })
    }

    /// Spawn the receive loop. Does nothing if the loop was already started or
    /// the session has been disconnected.
    pub fn start(&mut self, log: Arc<ChatLog>, status: Arc<watch::Sender<ConnectionStatus>>) {
        let Some(transport) = self.transport.take() else {
            warn!(target: "chatlay::session", "Receive loop for {} already started or closed", self.channel);
            return;
        };

        let ctx = LoopContext {
            channel: self.channel.clone(),
            log,
            status,
            state: self.state.clone(),
            cancel: self.cancel.clone(),
        };
        self.task = Some(tokio::spawn(receive_loop(transport, ctx)));
        debug!(target: "chatlay::session", "Receive loop started for {}", self.channel);
    }

    /// Close the transport and wait for the receive loop to stop.
    ///
    /// Idempotent. Teardown errors are swallowed. Once this returns, the
    /// session can no longer touch the chat log.
    pub async fn disconnect(&mut self) {
        self.cancel.cancel();

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.writer.shutdown().await {
                debug!(target: "chatlay::session", "Ignoring shutdown error for {}: {}", self.channel, e);
            }
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(target: "chatlay::session", "Receive loop for {} ended abnormally: {}", self.channel, e);
                }
                Err(_) => {
                    warn!(
                        target: "chatlay::session",
                        "Receive loop for {} did not stop within {:?}, aborting",
                        self.channel, SHUTDOWN_GRACE
                    );
                    task.abort();
                    let _ = task.await;
                }
            }
        }

        if self.state.send_replace(SessionState::Closed) != SessionState::Closed {
            info!(target: "chatlay::session", "Disconnected from {}", self.channel);
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn channel(&self) -> &ChannelTarget {
        &self.channel
    }

    /// Anonymous nickname used for this session.
    pub fn nick(&self) -> &str {
        &self.nick
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct LoopContext {
    channel: ChannelTarget,
    log: Arc<ChatLog>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    state: Arc<watch::Sender<SessionState>>,
    cancel: CancellationToken,
}

async fn receive_loop(mut transport: Transport, ctx: LoopContext) {
    let reason = loop {
        let line = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                debug!(target: "chatlay::session", "Receive loop for {} cancelled", ctx.channel);
                let _ = transport.writer.shutdown().await;
                ctx.state.send_replace(SessionState::Closed);
                return;
            }
            line = transport.read_line() => line,
        };

        match line {
            Ok(RawLine::Line(line)) => match classify(&line) {
                ProtocolEvent::KeepAlive => {
                    trace!(target: "chatlay::session::ping", "Answering keep-alive on {}", ctx.channel);
                    if let Err(e) = send_line(&mut transport.writer, KEEPALIVE_REPLY).await {
                        break ChatlayError::TransportRead(e.to_string());
                    }
                }
                ProtocolEvent::ChatPost { author, body } => {
                    ctx.log.push_user(author, body);
                }
                ProtocolEvent::Unrecognized => {
                    trace!(target: "chatlay::session", "Ignoring line: {}", line);
                }
            },
            Ok(RawLine::Oversized(len)) => {
                debug!(target: "chatlay::session", "Dropped {}-byte line on {}", len, ctx.channel);
            }
            Ok(RawLine::Eof) => break ChatlayError::EndOfStream,
            Err(e) => break ChatlayError::TransportRead(e.to_string()),
        }
    };

    ctx.state.send_replace(SessionState::Closed);

    // A caller-initiated disconnect can race with the drop; it stays silent.
    if ctx.cancel.is_cancelled() {
        return;
    }

    warn!(target: "chatlay::session", "Lost connection to {}: {}", ctx.channel, reason);
    ctx.log.push_system(format!("Disconnected: {}", reason));
    ctx.status.send_replace(ConnectionStatus::new(
        ConnectionState::Disconnected,
        Some(ctx.channel),
        "Disconnected",
    ));
}

async fn send_line(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(input: &[u8], max: usize) -> Vec<RawLine> {
        let mut reader = BufReader::with_capacity(16, input);
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        loop {
            let line = read_bounded_line(&mut reader, &mut buf, max).await.unwrap();
            let eof = line == RawLine::Eof;
            lines.push(line);
            if eof {
                return lines;
            }
        }
    }

    #[tokio::test]
    async fn test_read_strips_terminators() {
        let lines = read_all(b"PING :tmi.twitch.tv\r\nbare\n", 64).await;
        assert_eq!(
            lines,
            vec![
                RawLine::Line("PING :tmi.twitch.tv".to_string()),
                RawLine::Line("bare".to_string()),
                RawLine::Eof,
            ]
        );
    }

    #[tokio::test]
    async fn test_read_replaces_invalid_utf8() {
        let lines = read_all(b":eve!e PRIVMSG #c :\xff\xfe\r\nnext\r\n", 64).await;
        assert_eq!(lines[0], RawLine::Line(":eve!e PRIVMSG #c :\u{FFFD}\u{FFFD}".to_string()));
        assert_eq!(lines[1], RawLine::Line("next".to_string()));
    }

    #[tokio::test]
    async fn test_read_discards_oversized_line_and_continues() {
        let mut input = vec![b'a'; 100];
        input.extend_from_slice(b"\r\nok\r\n");
        let lines = read_all(&input, 32).await;
        assert_eq!(
            lines,
            vec![RawLine::Oversized(102), RawLine::Line("ok".to_string()), RawLine::Eof]
        );
    }

    #[tokio::test]
    async fn test_read_line_at_exact_limit_is_kept() {
        let lines = read_all(b"abcd\r\n", 6).await;
        assert_eq!(lines[0], RawLine::Line("abcd".to_string()));
    }

    #[tokio::test]
    async fn test_read_drops_partial_line_at_eof() {
        let lines = read_all(b"complete\npartial", 64).await;
        assert_eq!(lines, vec![RawLine::Line("complete".to_string()), RawLine::Eof]);
    }
}
