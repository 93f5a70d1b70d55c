//! Line codec for the Twitch IRC chat endpoint.
//!
//! Only the handful of lines the overlay cares about are recognized. The
//! chat-post rule is positional: the sender sits between the leading sigil
//! character (normally `:`) and the first `!`, the body follows the first `:`
//! after the sigil.
//! No attempt is made to validate the full IRC grammar.

/// Prefix of keep-alive probes sent by the server.
const KEEPALIVE_PREFIX: &str = "PING";

/// Marker identifying a chat post.
const CHAT_POST_MARKER: &str = "PRIVMSG";

/// Exact reply the server expects to a keep-alive probe.
pub const KEEPALIVE_REPLY: &str = "PONG :tmi.twitch.tv";

/// A classified inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Keep-alive probe; must be answered with [`KEEPALIVE_REPLY`].
    KeepAlive,
    /// A message posted in the channel.
    ChatPost { author: String, body: String },
    /// Anything else, including malformed chat posts.
    Unrecognized,
}

/// Classify one line received from the chat service.
///
/// Total: every input maps to exactly one event and nothing panics.
pub fn classify(line: &str) -> ProtocolEvent {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.starts_with(KEEPALIVE_PREFIX) {
        return ProtocolEvent::KeepAlive;
    }

    if line.contains(CHAT_POST_MARKER) {
        return parse_chat_post(line).unwrap_or_else(|| {
            tracing::trace!(target: "chatlay::codec", "Dropping malformed chat line: {}", line);
            ProtocolEvent::Unrecognized
        });
    }

    ProtocolEvent::Unrecognized
}

fn parse_chat_post(line: &str) -> Option<ProtocolEvent> {
    // The sigil is whatever character comes first, not necessarily ':'.
    let sigil = line.chars().next()?.len_utf8();
    let author_end = line.find('!')?;
    let body_start = sigil + line.get(sigil..)?.find(':')?;

    if author_end <= sigil || body_start <= author_end {
        return None;
    }

    let author = line.get(sigil..author_end)?;
    let body = line.get(body_start + 1..)?;

    Some(ProtocolEvent::ChatPost {
        author: author.to_string(),
        body: body.to_string(),
    })
}

/// Line announcing the (anonymous) nickname.
pub fn identity_line(nick: &str) -> String {
    format!("NICK {}", nick)
}

/// Line joining `#<channel>`; `channel` is expected to be normalized already.
pub fn join_line(channel: &str) -> String {
    format!("JOIN #{}", channel)
}
