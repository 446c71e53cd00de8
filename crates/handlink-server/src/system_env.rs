//! Production Environment implementation using system time.
//!
//! `SystemEnv` backs the rotation ticker with the real monotonic clock and
//! Tokio's timer. Behavior is therefore wall-clock dependent; deterministic
//! runs use the harness's simulated environment instead.

use std::time::Duration;

use handlink_core::env::Environment;

/// Production environment using system time.
///
/// Uses `std::time::Instant::now()` for time and `tokio::time::sleep()` for
/// async sleeping.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
