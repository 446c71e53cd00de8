//! TCP transport for the client.
//!
//! Provides [`ConnectedClient`], which owns the write half of the command
//! channel. Events are queued on an mpsc channel and a writer task encodes
//! them as newline-terminated lines. Gesture logic stays in the sans-IO
//! [`GestureSession`](handlink_core::GestureSession).
//!
//! The protocol is fire-and-forget: nothing is read back from the server.

use std::{future::Future, io, time::Duration};

use bytes::BytesMut;
use handlink_core::env::Environment;
use handlink_proto::GestureEvent;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
};

use crate::error::TransportError;

/// Events queued ahead of the writer before `send` waits.
const OUTBOUND_CAPACITY: usize = 64;

/// Handle to a connected client.
///
/// Events sent on [`ConnectedClient::to_server`] are written in order by an
/// internal task.
pub struct ConnectedClient {
    /// Send events to the server.
    pub to_server: mpsc::Sender<GestureEvent>,
    /// Writer task.
    writer: tokio::task::JoinHandle<()>,
}

impl ConnectedClient {
    /// Start a writer task over any byte sink.
    pub fn spawn<W>(writer: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (to_server, outbound) = mpsc::channel(OUTBOUND_CAPACITY);
        let writer = tokio::spawn(async move {
            if let Err(e) = run_writer(writer, outbound).await {
                tracing::warn!(error = %e, "Writer stopped");
            }
        });

        Self { to_server, writer }
    }

    /// Queue one event.
    ///
    /// # Errors
    ///
    /// `TransportError::Closed` once the writer task has stopped.
    pub async fn send(&self, event: GestureEvent) -> Result<(), TransportError> {
        self.to_server.send(event).await.map_err(|_| TransportError::Closed)
    }

    /// Stop the connection, discarding queued events.
    pub fn stop(&self) {
        self.writer.abort();
    }

    /// Flush queued events and shut the connection down.
    pub async fn close(self) {
        drop(self.to_server);
        if let Err(e) = self.writer.await
            && !e.is_cancelled()
        {
            tracing::error!(error = %e, "Writer task failed");
        }
    }
}

/// Connect to a Handlink server over TCP, retrying refused connections.
pub async fn connect<E: Environment>(
    address: &str,
    attempts: u32,
    retry_delay: Duration,
    env: &E,
) -> Result<ConnectedClient, TransportError> {
    let stream =
        connect_with_retry(|| TcpStream::connect(address), attempts, retry_delay, env).await?;
    stream.set_nodelay(true).map_err(TransportError::Connection)?;

    tracing::info!("Connected to {address}");
    Ok(ConnectedClient::spawn(stream))
}

/// Run `connect` until it succeeds, at most `attempts` times.
///
/// Only `ConnectionRefused` is retried, after sleeping `retry_delay`; any
/// other error fails immediately.
pub async fn connect_with_retry<F, Fut, S, E>(
    mut connect: F,
    attempts: u32,
    retry_delay: Duration,
    env: &E,
) -> Result<S, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<S>>,
    E: Environment,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect().await {
            Ok(stream) => return Ok(stream),
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused && attempt < attempts => {
                tracing::warn!(
                    attempt,
                    attempts,
                    "Connection refused, retrying in {retry_delay:?}"
                );
                env.sleep(retry_delay).await;
                attempt += 1;
            },
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                return Err(TransportError::RetriesExhausted { attempts, source: e });
            },
            Err(e) => return Err(TransportError::Connection(e)),
        }
    }
}

/// Drain the outbound channel into the socket.
///
/// Events already queued when the writer wakes are batched into one write.
async fn run_writer<W>(
    mut writer: W,
    mut outbound: mpsc::Receiver<GestureEvent>,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(1024);

    while let Some(event) = outbound.recv().await {
        buf.clear();
        event.encode_into(&mut buf);
        while let Ok(event) = outbound.try_recv() {
            event.encode_into(&mut buf);
        }

        writer.write_all(&buf).await?;
    }

    writer.shutdown().await?;
    Ok(())
}
