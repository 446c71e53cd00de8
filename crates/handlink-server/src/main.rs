//! Handlink server binary.
//!
//! # Usage
//!
//! ```bash
//! # Command channel on 12340, finger-only channel on 12345
//! handlink-server
//!
//! # Command channel only, verbose
//! handlink-server --bind 0.0.0.0:12340 --no-finger-channel --log-level debug
//! ```

use std::time::Duration;

use clap::Parser;
use handlink_server::{
    ConnectionConfig, DEFAULT_BIND_ADDRESS, DEFAULT_FINGER_BIND_ADDRESS, DispatcherConfig,
    Server, ServerRuntimeConfig,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Handlink scene host
#[derive(Parser, Debug)]
#[command(name = "handlink-server")]
#[command(about = "Applies gesture commands from tracking clients to a 3D scene")]
#[command(version)]
struct Args {
    /// Command channel address
    #[arg(short, long, default_value = DEFAULT_BIND_ADDRESS)]
    bind: String,

    /// Finger-only channel address
    #[arg(long, default_value = DEFAULT_FINGER_BIND_ADDRESS)]
    finger_bind: String,

    /// Disable the finger-only channel
    #[arg(long)]
    no_finger_channel: bool,

    /// Minimum milliseconds between accepted pinches per connection
    #[arg(long, default_value = "500")]
    pinch_cooldown_ms: u64,

    /// Milliseconds between rotation ticks
    #[arg(long, default_value = "50")]
    rotation_tick_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Handlink server starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        finger_bind_address: (!args.no_finger_channel).then_some(args.finger_bind),
        connection: ConnectionConfig {
            dispatcher: DispatcherConfig {
                pinch_cooldown: Duration::from_millis(args.pinch_cooldown_ms),
                ..Default::default()
            },
            ..Default::default()
        },
        rotation_tick: Duration::from_millis(args.rotation_tick_ms),
        ..Default::default()
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);
    if let Some(addr) = server.finger_addr() {
        tracing::info!("Finger channel on {addr}");
    }

    server.run().await?;

    Ok(())
}
