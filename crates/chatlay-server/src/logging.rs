//! Logging setup.
//!
//! A preset chosen by CLI flags gives every `chatlay::*` target a level,
//! `--log target=level` refines single targets, and `RUST_LOG` replaces both.

use clap::ValueEnum;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TARGET_PREFIX: &str = "chatlay::";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Baseline verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Connection lifecycle and API activity
    #[default]
    Production,
    Verbose,
    /// No keep-alive chatter
    Debug,
    /// Every received line
    Trace,
    Quiet,
}

impl LogPreset {
    /// Pick a preset from the CLI switches. Quiet wins over trace, trace over
    /// debug, debug over verbose.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => Self::Quiet,
            (_, true, ..) => Self::Trace,
            (_, _, true, _) => Self::Debug,
            (.., true) => Self::Verbose,
            _ => Self::Production,
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            Self::Production => &[
                "chatlay=info",
                "chatlay::session::ping=off",
                "chatlay::codec=warn",
                "chatlay::log=warn",
                "tower_http=warn",
            ],
            Self::Verbose => &["chatlay=info", "chatlay::session::ping=off", "tower_http=info"],
            Self::Debug => &["chatlay=debug", "chatlay::session::ping=off", "tower_http=debug"],
            Self::Trace => &["chatlay=trace", "tower_http=trace"],
            Self::Quiet => &["chatlay=warn", "tower_http=error"],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Extra `target=level` directives, applied after the preset.
    pub overrides: Vec<String>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(preset: LogPreset, log_args: &[String], format: LogFormat) -> Self {
        let overrides = log_args
            .iter()
            .flat_map(|arg| arg.split(','))
            .filter_map(parse_override)
            .collect();
        Self {
            preset,
            overrides,
            format,
        }
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }

        let directives = self
            .preset
            .directives()
            .iter()
            .copied()
            .chain(self.overrides.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// `session=debug` becomes `chatlay::session=debug`; unknown levels are dropped.
fn parse_override(part: &str) -> Option<String> {
    let (target, level) = part.split_once('=')?;
    let target = target.trim();
    let level = level.trim().to_ascii_lowercase();
    level.parse::<LevelFilter>().ok()?;

    if target.is_empty() {
        return None;
    }
    if target.starts_with(TARGET_PREFIX) || target == "tower_http" {
        Some(format!("{}={}", target, level))
    } else {
        Some(format!("{}{}={}", TARGET_PREFIX, target, level))
    }
}

pub fn init(config: &LogConfig) {
    let registry = tracing_subscriber::registry().with(config.build_filter());
    match config.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
