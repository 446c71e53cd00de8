//! Tracking loop.
//!
//! [`Tracker`] pulls captures from a [`LandmarkProvider`], feeds them to a
//! [`GestureSession`] stamped with the environment's clock, and forwards the
//! resulting events. [`Tracker::step`] is synchronous and I/O-free so tests
//! can drive it frame by frame; [`Tracker::run`] is the paced async loop.

use std::time::Duration;

use handlink_core::{GestureSession, SessionConfig, env::Environment};
use handlink_proto::GestureEvent;

use crate::{
    error::{ProviderError, TransportError},
    provider::LandmarkProvider,
    transport::ConnectedClient,
};

/// Counters reported when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Captures pulled from the provider
    pub frames: u64,
    /// Captures the provider failed to produce
    pub bad_frames: u64,
    /// Events sent
    pub events: u64,
}

/// Drives a gesture session from a landmark provider.
pub struct Tracker<P, E>
where
    P: LandmarkProvider,
    E: Environment,
{
    provider: P,
    session: GestureSession<E::Instant>,
    env: E,
    frame_interval: Duration,
    stats: TrackerStats,
}

impl<P, E> Tracker<P, E>
where
    P: LandmarkProvider,
    E: Environment,
{
    /// Create a tracker that paces captures `frame_interval` apart.
    pub fn new(provider: P, session: SessionConfig, env: E, frame_interval: Duration) -> Self {
        Self {
            provider,
            session: GestureSession::new(session),
            env,
            frame_interval,
            stats: TrackerStats::default(),
        }
    }

    /// The gesture session.
    pub fn session(&self) -> &GestureSession<E::Instant> {
        &self.session
    }

    /// Counters so far.
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Process the next capture at the current time.
    ///
    /// Returns `None` once the provider is exhausted.
    pub fn step(&mut self) -> Option<Result<Vec<GestureEvent>, ProviderError>> {
        let capture = match self.provider.next_capture()? {
            Ok(capture) => capture,
            Err(e) => {
                self.stats.bad_frames += 1;
                return Some(Err(e));
            },
        };

        self.stats.frames += 1;
        Some(Ok(self.session.process_frame(capture.frame(), self.env.now())))
    }

    /// Run until the provider is exhausted or the connection closes.
    ///
    /// Bad captures are logged and skipped. After the last capture the
    /// tracker reports the hand as gone, so an active control gesture is
    /// always closed with `CONTROL_END`.
    pub async fn run(mut self, client: &ConnectedClient) -> Result<TrackerStats, TransportError> {
        while let Some(result) = self.step() {
            match result {
                Ok(events) => self.send_all(client, events).await?,
                Err(e) => tracing::warn!(error = %e, "Skipping capture"),
            }
            self.env.sleep(self.frame_interval).await;
        }

        if self.session.state().control_active() {
            // The final frame must land outside the emission throttle.
            self.env.sleep(self.session.config().emit_interval).await;
            let events = self.session.process_frame(None, self.env.now());
            self.send_all(client, events).await?;
        }

        tracing::info!(
            frames = self.stats.frames,
            bad_frames = self.stats.bad_frames,
            events = self.stats.events,
            "Tracking finished"
        );
        Ok(self.stats)
    }

    async fn send_all(
        &mut self,
        client: &ConnectedClient,
        events: Vec<GestureEvent>,
    ) -> Result<(), TransportError> {
        for event in events {
            tracing::debug!(event = event.name(), "Sending");
            client.send(event).await?;
            self.stats.events += 1;
        }
        Ok(())
    }
}
