//! Simulated environment on Turmoil's virtual clock.

use std::time::Duration;

use handlink_core::env::Environment;

/// Environment whose time is the simulation's time.
///
/// Inside a Turmoil host or client, Tokio's clock is driven by the
/// simulation, so `now()` and `sleep()` advance only as the simulation
/// steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimEnv;

impl SimEnv {
    /// Create a simulated environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SimEnv {
    type Instant = tokio::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
