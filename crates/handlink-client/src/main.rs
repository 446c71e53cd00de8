//! Handlink tracking client binary.
//!
//! # Usage
//!
//! ```bash
//! # Play the built-in gesture tour against a local server
//! handlink-client
//!
//! # Replay a recorded session with discrete movement and pointing samples
//! handlink-client --replay session.cbor --movement discrete --point-dir
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use handlink_client::{
    ClientConfig, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_SERVER_ADDRESS, LandmarkProvider,
    ReplayProvider, ScriptedProvider, SystemClock, TrackerStats, TransportError,
};
use handlink_core::{MovementMode, SessionConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Palm movement reporting while a fist is held
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Movement {
    /// Camera rotation only
    Off,
    /// Continuous VECTOR messages
    Vector,
    /// MOVE messages on direction changes
    Discrete,
}

impl From<Movement> for MovementMode {
    fn from(movement: Movement) -> Self {
        match movement {
            Movement::Off => Self::Off,
            Movement::Vector => Self::Vector,
            Movement::Discrete => Self::Discrete,
        }
    }
}

/// Handlink tracking client
#[derive(Parser, Debug)]
#[command(name = "handlink-client")]
#[command(about = "Sends hand gesture commands to a Handlink server")]
#[command(version)]
struct Args {
    /// Server command channel address
    #[arg(short, long, default_value = DEFAULT_SERVER_ADDRESS)]
    server: String,

    /// Recorded session to replay (plays a built-in demo when omitted)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Palm movement reporting while a fist is held
    #[arg(long, value_enum, default_value = "off")]
    movement: Movement,

    /// Send POINT_DIR samples while pointing
    #[arg(long)]
    point_dir: bool,

    /// Do not send finger tracking lines
    #[arg(long)]
    no_fingers: bool,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = DEFAULT_CONNECT_ATTEMPTS)]
    attempts: u32,

    /// Milliseconds between refused connection attempts
    #[arg(long, default_value = "2000")]
    retry_delay_ms: u64,

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

    let mut config = ClientConfig {
        server_address: args.server,
        connect_attempts: args.attempts,
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        session: SessionConfig {
            movement_mode: args.movement.into(),
            emit_point_dir: args.point_dir,
            emit_finger_tracking: !args.no_fingers,
            ..Default::default()
        },
        ..Default::default()
    };

    tracing::info!("Handlink client starting");

    let stats = match args.replay {
        Some(path) => {
            tracing::info!("Replaying {}", path.display());
            let replay = ReplayProvider::open(&path)?;
            config.frame_interval = Duration::from_millis(replay.frame_interval_ms());
            track(replay, config).await?
        },
        None => {
            tracing::info!("No recording given, playing the demo script");
            track(ScriptedProvider::demo(), config).await?
        },
    };

    tracing::info!(frames = stats.frames, events = stats.events, "Done");
    Ok(())
}

async fn track<P: LandmarkProvider>(
    provider: P,
    config: ClientConfig,
) -> Result<TrackerStats, TransportError> {
    handlink_client::run(provider, config, SystemClock).await
}
