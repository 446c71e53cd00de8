//! Environment abstraction for deterministic testing.
//!
//! Decouples gesture and rotation logic from the system clock. Production
//! drivers use real time, the simulation harness uses Turmoil's virtual
//! clock, and the state machines themselves only ever see the `Instant`
//! values they are handed.

use std::time::Duration;

/// Abstract environment providing time and async sleeping.
///
/// # Safety
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use virtual time (e.g., `tokio::time::Instant` under
    /// Turmoil).
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// # Invariants
    ///
    /// - Subsequent calls return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code (tick loops, retry backoff) should sleep; the state
    /// machines never do.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
