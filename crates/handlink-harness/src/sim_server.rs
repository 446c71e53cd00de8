//! Simulation server wrapper for testing with turmoil.
//!
//! `SimServer` runs the production connection handler and rotation ticker
//! over turmoil's deterministic TCP, with [`SimEnv`] supplying time. The
//! scene lives in a [`SimHub`] that tests keep a handle to, so assertions
//! can inspect it from inside the simulation.

use std::{io, net::SocketAddr, time::Duration};

use handlink_core::RotationConfig;
use handlink_server::{
    ConnectionConfig, DEFAULT_ROTATION_TICK, MemoryScene, Scene, SceneHub, SharedHub,
    handle_connection, run_rotation_ticker,
};
use turmoil::net::TcpListener;

use crate::SimEnv;

/// Scene hub on the simulated clock.
pub type SimHub<S = MemoryScene> = SharedHub<S, tokio::time::Instant>;

/// Create a hub around a fresh [`MemoryScene`].
pub fn create_shared_hub() -> SimHub {
    SceneHub::new(MemoryScene::new(), RotationConfig::default()).shared()
}

/// Simulation server for testing with turmoil.
///
/// Serves every accepted connection in its own task, like the production
/// server. There is one listener per `SimServer`; bind it with
/// [`ConnectionConfig::finger_only`] to simulate the finger channel.
pub struct SimServer<S: Scene = MemoryScene> {
    listener: TcpListener,
    hub: SimHub<S>,
    config: ConnectionConfig,
    rotation_tick: Duration,
}

impl<S: Scene> SimServer<S> {
    /// Bind with default connection settings.
    pub async fn bind(address: &str, hub: SimHub<S>) -> io::Result<Self> {
        Self::bind_with_config(address, hub, ConnectionConfig::default()).await
    }

    /// Bind with custom connection settings.
    pub async fn bind_with_config(
        address: &str,
        hub: SimHub<S>,
        config: ConnectionConfig,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, hub, config, rotation_tick: DEFAULT_ROTATION_TICK })
    }

    /// Interval between rotation ticks.
    #[must_use]
    pub fn with_rotation_tick(mut self, rotation_tick: Duration) -> Self {
        self.rotation_tick = rotation_tick;
        self
    }

    /// Bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections until the listener fails.
    pub async fn run(self) -> io::Result<()> {
        let env = SimEnv::new();
        tokio::spawn(run_rotation_ticker(SharedHub::clone(&self.hub), env, self.rotation_tick));

        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::info!(%peer, "Simulated connection");

            let hub = SharedHub::clone(&self.hub);
            let config = self.config.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer, hub, env, &config).await {
                    tracing::warn!(%peer, error = %e, "Connection error");
                }
            });
        }
    }
}
