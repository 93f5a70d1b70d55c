//! Channel identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest channel name Twitch allows.
pub const MAX_CHANNEL_LEN: usize = 25;

/// A normalized, lower-case channel name without the leading `#`.
///
/// All protocol interactions (JOIN, display) use this form. Construct it with
/// [`ChannelTarget::parse`], which trims whitespace, strips one leading `#`
/// and lower-cases the rest. The result is always a Twitch login:
/// 1 to [`MAX_CHANNEL_LEN`] characters from `[a-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelTarget(String);

impl ChannelTarget {
    /// Normalize a user-supplied channel name. Returns `None` when nothing is
    /// left after normalization or the name could not be a Twitch login.
    ///
    /// Interior whitespace, line breaks, `,` and `#` are rejected: they would
    /// otherwise end up verbatim in the JOIN line.
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let bare = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
        let valid = !bare.is_empty()
            && bare.len() <= MAX_CHANNEL_LEN
            && bare.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
        valid.then(|| Self(bare.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelTarget {
    /// Formats as `#<channel>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl TryFrom<String> for ChannelTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("Invalid channel name: '{}'", value))
    }
}

impl From<ChannelTarget> for String {
    fn from(target: ChannelTarget) -> Self {
        target.0
    }
}
