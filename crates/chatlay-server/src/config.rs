//! Server configuration.

use anyhow::Result;
use chatlay_core::SessionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Channel to join at startup. Empty means wait for `PUT /api/channel`.
    #[serde(default)]
    pub channel: String,
    #[serde(default = "default_chat_host")]
    pub chat_host: String,
    #[serde(default = "default_chat_port")]
    pub chat_port: u16,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./overlay")
}

fn default_chat_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

fn default_chat_port() -> u16 {
    6667
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            channel: String::new(),
            chat_host: default_chat_host(),
            chat_port: default_chat_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from `config/default.toml`, then the per-user config
    /// directory (`<config_dir>/chatlay/config.toml`), or fall back to defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("config/default.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(user) = dirs::config_dir().map(|d| d.join("chatlay").join("config.toml")) {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Config::default())
    }

    /// Settings for connecting to the chat service.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.chat_host.clone(),
            port: self.chat_port,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    /// The startup channel, if one is configured.
    pub fn startup_channel(&self) -> Option<&str> {
        let channel = self.channel.trim();
        (!channel.is_empty()).then_some(channel)
    }
}
