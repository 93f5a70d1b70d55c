//! Chatlay server - headless chat overlay backend.

use anyhow::Result;
use axum::Router;
use chatlay_server::{config, logging, routes, state};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use config::Config;
use logging::{LogConfig, LogFormat, LogPreset};
use state::AppState;

/// Chatlay server - live Twitch chat for stream overlays.
#[derive(Parser, Debug)]
#[command(name = "chatlay-server")]
#[command(about = "Streams a Twitch channel's chat to overlay clients over HTTP/WebSocket")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Channel to join at startup (overrides config)
    #[arg(long)]
    channel: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging (excludes keep-alive traces)
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (every received line)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "session=debug").
    /// Can be specified multiple times. Targets are prefixed with "chatlay::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let preset = LogPreset::from_flags(cli.verbose, cli.debug, cli.trace, cli.quiet);
    let log_config = LogConfig::new(preset, &cli.log_overrides, cli.log_format);
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(channel) = cli.channel {
        config.channel = channel;
    }

    tracing::info!(
        target: "chatlay::startup",
        "Loaded configuration (port: {}, chat: {}:{})",
        config.port, config.chat_host, config.chat_port
    );

    let state = Arc::new(AppState::new(config.clone()));
    spawn_initial_connect(state.clone());

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .nest("/ws", routes::ws_routes())
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(target: "chatlay::startup", "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.controller.disconnect().await;
    tracing::info!(target: "chatlay::startup", "Shut down");
    Ok(())
}

/// Join the configured channel in the background, or tell the viewer how to
/// pick one. Connecting can take up to the connect timeout, so it must not
/// hold up the listener.
fn spawn_initial_connect(state: Arc<AppState>) {
    let Some(channel) = state.config.startup_channel().map(str::to_string) else {
        state.log.push_system("Waiting for you to set a Twitch channel...");
        state.log.push_system("Use PUT /api/channel to choose one");
        state.controller.set_status_message("No channel configured");
        return;
    };

    tokio::spawn(async move {
        if let Err(e) = state.controller.set_channel(&channel).await {
            tracing::warn!(target: "chatlay::startup", "Initial connect to '{}' failed: {}", channel, e);
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "chatlay::startup", "Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "chatlay::startup", "Shutdown requested");
}
