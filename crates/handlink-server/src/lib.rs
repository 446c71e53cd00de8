//! Handlink scene host.
//!
//! Accepts gesture command streams over TCP and applies them to a shared
//! scene.
//!
//! # Architecture
//!
//! Each connection runs in its own task with its own
//! [`LineReassembler`] and [`CommandDispatcher`]. Dispatchers are sans-IO:
//! they turn commands into [`SceneAction`]s, which the connection task
//! applies through the [`SceneHub`] under a single-writer lock. A separate
//! ticker task advances rotation continuations so objects keep turning (and
//! eventually stop) when pointing samples dry up.
//!
//! # Components
//!
//! - [`Scene`] / [`MemoryScene`]: Scene API and the in-memory model
//! - [`CommandDispatcher`]: per-connection command mapping
//! - [`SceneHub`]: shared scene plus rotation continuations
//! - [`Server`]: Tokio TCP listeners, connection tasks, rotation ticker
//! - [`SystemEnv`]: production environment (real time)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod error;
mod hub;
pub mod scene;
mod system_env;

use std::{fmt::Display, net::SocketAddr, time::Duration};

pub use dispatcher::{
    ChannelKind, CommandDispatcher, DispatcherConfig, Overlay, SceneAction,
    DEFAULT_EXTRUDE_STEP, DEFAULT_MOVE_STEP, DEFAULT_PINCH_COOLDOWN,
};
pub use error::{DispatchError, ServerError};
use handlink_core::{RotationConfig, env::Environment};
use handlink_proto::{Command, DEFAULT_MAX_LINE_LEN, LineReassembler};
pub use hub::{SceneHub, SharedHub};
pub use scene::{MemoryScene, ObjectId, Scene, SceneError};
pub use system_env::SystemEnv;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    net::TcpListener,
};

/// Default command channel address.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:12340";

/// Default finger-only channel address.
pub const DEFAULT_FINGER_BIND_ADDRESS: &str = "127.0.0.1:12345";

/// Bytes requested per socket read.
pub const DEFAULT_READ_BUFFER: usize = 1024;

/// Interval between rotation ticks.
pub const DEFAULT_ROTATION_TICK: Duration = Duration::from_millis(50);

/// Per-connection settings.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Longest accepted line, excluding the newline
    pub max_line_len: usize,
    /// Bytes requested per read
    pub read_buffer: usize,
    /// Dispatcher settings
    pub dispatcher: DispatcherConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            read_buffer: DEFAULT_READ_BUFFER,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Same settings for the finger-only channel.
    pub fn finger_only(&self) -> Self {
        Self {
            dispatcher: DispatcherConfig {
                channel: ChannelKind::FingerOnly,
                ..self.dispatcher.clone()
            },
            ..self.clone()
        }
    }
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Command channel address (e.g., "127.0.0.1:12340")
    pub bind_address: String,
    /// Finger-only channel address, `None` to disable it
    pub finger_bind_address: Option<String>,
    /// Per-connection settings
    pub connection: ConnectionConfig,
    /// Interval between rotation ticks
    pub rotation_tick: Duration,
    /// Rotation continuation settings
    pub rotation: RotationConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            finger_bind_address: Some(DEFAULT_FINGER_BIND_ADDRESS.to_string()),
            connection: ConnectionConfig::default(),
            rotation_tick: DEFAULT_ROTATION_TICK,
            rotation: RotationConfig::default(),
        }
    }
}

impl ServerRuntimeConfig {
    fn validate(&self) -> Result<(), ServerError> {
        if self.connection.read_buffer == 0 {
            return Err(ServerError::Config("read buffer must be non-zero".to_string()));
        }
        if self.connection.max_line_len == 0 {
            return Err(ServerError::Config("max line length must be non-zero".to_string()));
        }
        if self.rotation_tick.is_zero() {
            return Err(ServerError::Config("rotation tick must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Production Handlink server.
///
/// Owns the listeners and the shared scene. [`Server::run`] serves until
/// the command listener fails.
pub struct Server<S: Scene = MemoryScene> {
    listener: TcpListener,
    finger_listener: Option<TcpListener>,
    hub: SharedHub<S>,
    env: SystemEnv,
    config: ServerRuntimeConfig,
}

impl Server<MemoryScene> {
    /// Create and bind a server around a fresh [`MemoryScene`].
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        Self::bind_with_scene(config, MemoryScene::new()).await
    }
}

impl<S: Scene> Server<S> {
    /// Create and bind a server around an existing scene.
    ///
    /// Failing to bind the finger-only channel is logged and that channel
    /// is skipped.
    pub async fn bind_with_scene(
        config: ServerRuntimeConfig,
        scene: S,
    ) -> Result<Self, ServerError> {
        config.validate()?;

        let listener = bind_listener(&config.bind_address).await?;
        let finger_listener = match &config.finger_bind_address {
            Some(address) => match bind_listener(address).await {
                Ok(listener) => Some(listener),
                Err(e) => {
                    tracing::error!(error = %e, "finger channel disabled");
                    None
                },
            },
            None => None,
        };

        let hub = SceneHub::new(scene, config.rotation.clone()).shared();

        Ok(Self { listener, finger_listener, hub, env: SystemEnv::new(), config })
    }

    /// Command channel address.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Finger-only channel address, if that channel is up.
    pub fn finger_addr(&self) -> Option<SocketAddr> {
        self.finger_listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Handle to the shared scene.
    pub fn hub(&self) -> SharedHub<S> {
        SharedHub::clone(&self.hub)
    }

    /// Run the server, accepting connections on every listener.
    ///
    /// This method runs until the process is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.local_addr()?);

        tokio::spawn(run_rotation_ticker(
            SharedHub::clone(&self.hub),
            self.env.clone(),
            self.config.rotation_tick,
        ));

        if let Some(listener) = self.finger_listener {
            tokio::spawn(accept_loop(
                listener,
                SharedHub::clone(&self.hub),
                self.env.clone(),
                self.config.connection.finger_only(),
            ));
        }

        accept_loop(self.listener, self.hub, self.env, self.config.connection).await;
        Ok(())
    }
}

async fn bind_listener(address: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address: address.to_string(), source })
}

async fn accept_loop<S: Scene>(
    listener: TcpListener,
    hub: SharedHub<S>,
    env: SystemEnv,
    config: ConnectionConfig,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!(%peer, channel = ?config.dispatcher.channel, "Connected");
                let hub = SharedHub::clone(&hub);
                let env = env.clone();
                let config = config.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, hub, env, &config).await {
                        tracing::warn!(%peer, error = %e, "Connection error");
                    }
                });
            },
            Err(e) => {
                tracing::error!(error = %ServerError::Accept(e), "Accept failed");
            },
        }
    }
}

/// Serve one connection until the peer closes it.
///
/// Reads once per readiness, reassembles lines, and dispatches each
/// complete line in arrival order. Malformed lines and failed scene calls
/// are logged and skipped; only a read error ends the connection early.
/// All per-connection state is dropped on return.
pub async fn handle_connection<R, S, E>(
    mut stream: R,
    peer: impl Display,
    hub: SharedHub<S, E::Instant>,
    env: E,
    config: &ConnectionConfig,
) -> Result<(), ServerError>
where
    R: AsyncRead + Unpin,
    S: Scene,
    E: Environment,
{
    let mut reassembler = LineReassembler::new(config.max_line_len);
    let mut dispatcher = CommandDispatcher::new(config.dispatcher.clone());
    let mut buf = vec![0u8; config.read_buffer.max(1)];

    loop {
        let n = stream.read(&mut buf).await.map_err(ServerError::Transport)?;
        if n == 0 {
            if reassembler.buffered() > 0 {
                tracing::debug!(
                    %peer,
                    bytes = reassembler.buffered(),
                    "Discarding unterminated message"
                );
            }
            tracing::info!(%peer, "Connection closed");
            return Ok(());
        }

        for line in reassembler.push(&buf[..n]) {
            match line {
                Ok(line) => process_line(&line, &mut dispatcher, &hub, &env, &peer).await,
                Err(e) => tracing::warn!(%peer, error = %e, "Dropping message"),
            }
        }
    }
}

async fn process_line<S, E>(
    line: &str,
    dispatcher: &mut CommandDispatcher<E::Instant>,
    hub: &SharedHub<S, E::Instant>,
    env: &E,
    peer: &impl Display,
) where
    S: Scene,
    E: Environment,
{
    let command = match Command::decode(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(%peer, error = %e, line, "Dropping malformed message");
            return;
        },
    };

    let name = command.name();
    if let Command::FingerTrack(fingers) = &command {
        for finger in fingers {
            tracing::trace!(%peer, finger = finger.name(), x = finger.x, y = finger.y, "Finger");
        }
    } else {
        tracing::debug!(%peer, command = name, "Received");
    }

    let Some(action) = dispatcher.dispatch(command, env.now()) else {
        return;
    };

    let mut hub = hub.lock().await;
    if let Err(source) = hub.apply(action, env.now()) {
        let err = DispatchError { command: name, source };
        tracing::warn!(%peer, error = %err, "Scene update failed");
    }
}

/// Advance rotation continuations forever, one step per `interval`.
pub async fn run_rotation_ticker<S, E>(hub: SharedHub<S, E::Instant>, env: E, interval: Duration)
where
    S: Scene,
    E: Environment,
{
    loop {
        env.sleep(interval).await;

        let mut hub = hub.lock().await;
        for (object, error) in hub.tick(env.now()) {
            tracing::warn!(%object, %error, "Rotation stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use handlink_core::Vec3;
    use tokio::io::AsyncWriteExt;

    use super::*;
    use crate::scene::DEFAULT_OBJECT_NAME;

    fn hub() -> SharedHub<MemoryScene> {
        SceneHub::new(MemoryScene::new(), RotationConfig::default()).shared()
    }

    async fn serve(chunks: &[&[u8]], hub: SharedHub<MemoryScene>, config: ConnectionConfig) {
        let (mut client, server) = tokio::io::duplex(64);
        let task = tokio::spawn({
            let hub = SharedHub::clone(&hub);
            async move { handle_connection(server, "test", hub, SystemEnv::new(), &config).await }
        });

        for chunk in chunks {
            client.write_all(chunk).await.unwrap();
        }
        drop(client);

        task.await.unwrap().unwrap();
    }

    async fn cube_position(hub: &SharedHub<MemoryScene>) -> Vec3 {
        let hub = hub.lock().await;
        let id = hub.scene().find(DEFAULT_OBJECT_NAME).unwrap();
        hub.scene().object(id).unwrap().position
    }

    #[tokio::test]
    async fn split_writes_are_reassembled() {
        let hub = hub();

        serve(
            &[b"MOVE:RI", b"GHT\nMOVE:", b"UP\n"],
            SharedHub::clone(&hub),
            ConnectionConfig::default(),
        )
        .await;

        assert_eq!(cube_position(&hub).await, Vec3::new(5.0, 0.0, 5.0));
    }

    #[tokio::test]
    async fn malformed_line_keeps_connection_usable() {
        let hub = hub();

        serve(
            &[b"POINT_DIR:1,2\nMOVE:LEFT\n"],
            SharedHub::clone(&hub),
            ConnectionConfig::default(),
        )
        .await;

        assert_eq!(cube_position(&hub).await, Vec3::new(-5.0, 0.0, 0.0));
    }

    #[tokio::test]
    async fn scene_failure_keeps_connection_usable() {
        let hub = hub();

        serve(
            &[b"PEACE:LEFT\nGESTURE:POINT,1,2\nGESTURE:ROTATE,0,2,0\nVECTOR:1,2\n"],
            SharedHub::clone(&hub),
            ConnectionConfig::default(),
        )
        .await;

        assert_eq!(cube_position(&hub).await, Vec3::new(1.0, 0.0, -2.0));
    }

    #[tokio::test]
    async fn unterminated_tail_is_discarded() {
        let hub = hub();

        serve(
            &[b"MOVE:RIGHT\nMOVE:RIGHT"],
            SharedHub::clone(&hub),
            ConnectionConfig::default(),
        )
        .await;

        assert_eq!(cube_position(&hub).await, Vec3::new(5.0, 0.0, 0.0));
    }

    #[tokio::test]
    async fn oversized_line_is_dropped() {
        let hub = hub();
        let config = ConnectionConfig { max_line_len: 16, ..ConnectionConfig::default() };
        let long = format!("CREATE:{}\nMOVE:DOWN\n", "x".repeat(64));

        serve(&[long.as_bytes()], SharedHub::clone(&hub), config).await;

        assert!(hub.lock().await.scene().history().is_empty());
        assert_eq!(cube_position(&hub).await, Vec3::new(0.0, 0.0, -5.0));
    }

    #[tokio::test]
    async fn finger_channel_leaves_scene_alone() {
        let hub = hub();
        let config = ConnectionConfig::default().finger_only();

        serve(
            &[b"0,10,20;1,30,40\nMOVE:LEFT\nPINCH:320,240\n"],
            SharedHub::clone(&hub),
            config,
        )
        .await;

        let hub = hub.lock().await;
        assert_eq!(hub.scene().selection(), None);
        let id = hub.scene().find(DEFAULT_OBJECT_NAME).unwrap();
        assert_eq!(hub.scene().object(id).unwrap().position, Vec3::ZERO);
    }

    #[tokio::test]
    async fn create_reaches_command_processor() {
        let hub = hub();

        serve(
            &[b"CREATE:create box Lid\n"],
            SharedHub::clone(&hub),
            ConnectionConfig::default(),
        )
        .await;

        let hub = hub.lock().await;
        assert_eq!(hub.scene().history(), ["create box Lid"]);
        assert!(hub.scene().find("Lid").is_some());
    }

    #[tokio::test]
    async fn bind_rejects_zero_buffer() {
        let config = ServerRuntimeConfig {
            bind_address: "127.0.0.1:0".to_string(),
            finger_bind_address: None,
            connection: ConnectionConfig { read_buffer: 0, ..ConnectionConfig::default() },
            ..ServerRuntimeConfig::default()
        };

        assert!(matches!(Server::bind(config).await, Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn bind_reports_address_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap().to_string();
        let config = ServerRuntimeConfig {
            bind_address: address.clone(),
            finger_bind_address: None,
            ..ServerRuntimeConfig::default()
        };

        match Server::bind(config).await {
            Err(ServerError::Bind { address: failed, .. }) => assert_eq!(failed, address),
            other => panic!("expected bind error, got {:?}", other.err()),
        }
    }
}
