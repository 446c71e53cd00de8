//! Handlink tracking client.
//!
//! Turns a stream of hand landmark frames into gesture commands and sends
//! them to a Handlink server.
//!
//! # Architecture
//!
//! ```text
//! LandmarkProvider ──> Tracker ──> GestureSession ──> ConnectedClient ──> TCP
//!   (replay/script)     (pacing)     (sans-IO core)     (writer task)
//! ```
//!
//! # Components
//!
//! - [`LandmarkProvider`]: source of captures ([`ReplayProvider`],
//!   [`ScriptedProvider`])
//! - [`Tracker`]: paces captures and feeds the gesture session
//! - [`ConnectedClient`]: queued, newline-framed writer over TCP
//! - [`SystemClock`]: real-time environment

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod tracker;
pub mod transport;

use std::time::Duration;

pub use error::{ProviderError, TransportError};
use handlink_core::{SessionConfig, env::Environment};
pub use provider::{
    Capture, DEFAULT_FRAME_INTERVAL_MS, LandmarkProvider, RecordedFrame, Recording,
    ReplayProvider, ScriptedProvider,
};
pub use tracker::{Tracker, TrackerStats};
pub use transport::{ConnectedClient, connect, connect_with_retry};

/// Default server command channel.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:12340";

/// Connection attempts before giving up.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

/// Delay between refused connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server command channel address
    pub server_address: String,
    /// Connection attempts before giving up
    pub connect_attempts: u32,
    /// Delay between refused attempts
    pub retry_delay: Duration,
    /// Time between provider captures
    pub frame_interval: Duration,
    /// Gesture session settings
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
            session: SessionConfig::default(),
        }
    }
}

/// Connect to the server and track until `provider` runs dry.
///
/// # Errors
///
/// Fails if the server cannot be reached or the connection closes while
/// events are still being sent.
pub async fn run<P, E>(
    provider: P,
    config: ClientConfig,
    env: E,
) -> Result<TrackerStats, TransportError>
where
    P: LandmarkProvider,
    E: Environment,
{
    let client =
        connect(&config.server_address, config.connect_attempts, config.retry_delay, &env).await?;

    let tracker = Tracker::new(provider, config.session, env, config.frame_interval);
    let stats = tracker.run(&client).await;
    client.close().await;
    stats
}

/// Real-time environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Environment for SystemClock {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
