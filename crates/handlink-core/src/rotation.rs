//! Smoothed, self-expiring object rotation.
//!
//! Pointing-direction samples arrive irregularly and stop without warning
//! when the hand leaves the frame. [`RotationContinuation`] keeps an object
//! turning toward the last sampled direction and stops it once samples dry
//! up.
//!
//! # State Machine
//!
//! ```text
//!            sample (not neutral)
//! ┌─────────┐ ──────────────────> ┌──────────┐ ──┐ sample / tick
//! │ Stopped │                     │ Rotating │   │ -> Rotate(step)
//! └─────────┘ <────────────────── └──────────┘ <─┘
//!            neutral sample, or no sample for longer than `stale_after`
//! ```
//!
//! Every step moves `current` toward `target` and damps it:
//! `current = (current + (target - current) * smoothing_factor) * rotation_speed`.
//! The step is an incremental rotation to apply on top of the object's
//! existing orientation.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

/// Fraction of the remaining distance to the target covered per step.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.005;

/// Damping applied to every step.
pub const DEFAULT_ROTATION_SPEED: f64 = 0.5;

/// Rotation stops when no sample arrives for longer than this.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(500);

/// Samples with every component inside this band mean "stop".
pub const DEFAULT_NEUTRAL_TOLERANCE: f64 = 5.0;

/// Yaw, pitch and roll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ypr {
    /// Yaw
    pub yaw: f64,
    /// Pitch
    pub pitch: f64,
    /// Roll
    pub roll: f64,
}

impl Ypr {
    /// No rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a rotation triple.
    pub const fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    fn is_within(self, tolerance: f64) -> bool {
        self.yaw.abs() < tolerance && self.pitch.abs() < tolerance && self.roll.abs() < tolerance
    }
}

/// Rotation continuation configuration.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Smoothing factor per step
    pub smoothing_factor: f64,
    /// Damping per step
    pub rotation_speed: f64,
    /// Sample staleness timeout (strict)
    pub stale_after: Duration,
    /// Neutral band around zero
    pub neutral_tolerance: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            stale_after: DEFAULT_STALE_AFTER,
            neutral_tolerance: DEFAULT_NEUTRAL_TOLERANCE,
        }
    }
}

/// Rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// Not rotating
    Stopped,
    /// Rotating toward the last sample
    Rotating,
}

/// Actions returned by the rotation state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationAction {
    /// Apply this incremental rotation to the object
    Rotate(Ypr),
    /// Rotation ended
    Stopped,
}

/// Rotation continuation for one object.
///
/// This is a pure state machine: time is passed to every method that needs
/// it.
#[derive(Debug, Clone)]
pub struct RotationContinuation<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    config: RotationConfig,
    state: RotationState,
    current: Ypr,
    target: Ypr,
    last_sample: Option<I>,
}

impl<I> RotationContinuation<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a stopped continuation.
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            state: RotationState::Stopped,
            current: Ypr::ZERO,
            target: Ypr::ZERO,
            last_sample: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Smoothed rotation most recently applied.
    pub fn current(&self) -> Ypr {
        self.current
    }

    /// Last sampled target.
    pub fn target(&self) -> Ypr {
        self.target
    }

    /// Feed one pointing-direction sample.
    ///
    /// A neutral sample stops rotation immediately. Any other sample sets
    /// the target and advances one step. If the previous sample had already
    /// gone stale, the old rotation is stopped before the new one starts.
    pub fn on_sample(&mut self, target: Ypr, now: I) -> Vec<RotationAction> {
        let mut actions = self.expire(now);

        if target.is_within(self.config.neutral_tolerance) {
            if self.state == RotationState::Rotating {
                self.stop();
                actions.push(RotationAction::Stopped);
            }
            return actions;
        }

        self.target = target;
        self.last_sample = Some(now);
        self.state = RotationState::Rotating;
        actions.push(RotationAction::Rotate(self.step()));
        actions
    }

    /// Periodic tick: stop if stale, otherwise keep turning.
    pub fn tick(&mut self, now: I) -> Vec<RotationAction> {
        if self.state != RotationState::Rotating {
            return Vec::new();
        }

        let expired = self.expire(now);
        if !expired.is_empty() {
            return expired;
        }

        vec![RotationAction::Rotate(self.step())]
    }

    /// True if a rotation is running but its last sample is older than the
    /// staleness timeout.
    pub fn is_stale(&self, now: I) -> bool {
        self.state == RotationState::Rotating
            && self.last_sample.is_some_and(|last| now - last > self.config.stale_after)
    }

    fn expire(&mut self, now: I) -> Vec<RotationAction> {
        if self.is_stale(now) {
            self.stop();
            return vec![RotationAction::Stopped];
        }
        Vec::new()
    }

    fn step(&mut self) -> Ypr {
        let sf = self.config.smoothing_factor;
        let speed = self.config.rotation_speed;
        let advance = |current: f64, target: f64| (current + (target - current) * sf) * speed;

        self.current = Ypr::new(
            advance(self.current.yaw, self.target.yaw),
            advance(self.current.pitch, self.target.pitch),
            advance(self.current.roll, self.target.roll),
        );
        self.current
    }

    fn stop(&mut self) {
        self.state = RotationState::Stopped;
        self.current = Ypr::ZERO;
        self.target = Ypr::ZERO;
        self.last_sample = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> impl Fn(u64) -> Instant {
        #[allow(clippy::disallowed_methods)]
        let base = Instant::now();
        move |ms| base + Duration::from_millis(ms)
    }

    #[test]
    fn single_sample_step() {
        let at = clock();
        let mut rotation = RotationContinuation::new(RotationConfig::default());

        let actions = rotation.on_sample(Ypr::new(100.0, 0.0, 0.0), at(0));

        assert_eq!(rotation.state(), RotationState::Rotating);
        let [RotationAction::Rotate(step)] = actions.as_slice() else {
            panic!("expected one rotation step, got {actions:?}");
        };
        assert!((step.yaw - 0.25).abs() < 1e-12);
        assert_eq!((step.pitch, step.roll), (0.0, 0.0));
    }

    #[test]
    fn stale_after_silence() {
        let at = clock();
        let mut rotation = RotationContinuation::new(RotationConfig::default());
        rotation.on_sample(Ypr::new(100.0, 0.0, 0.0), at(0));

        assert!(matches!(rotation.tick(at(500)).as_slice(), [RotationAction::Rotate(_)]));
        assert_eq!(rotation.tick(at(600)), vec![RotationAction::Stopped]);
        assert_eq!(rotation.state(), RotationState::Stopped);
        assert!(rotation.tick(at(700)).is_empty());
    }

    #[test]
    fn neutral_sample_stops() {
        let at = clock();
        let mut rotation = RotationContinuation::new(RotationConfig::default());
        rotation.on_sample(Ypr::new(0.0, 80.0, 0.0), at(0));

        let actions = rotation.on_sample(Ypr::new(4.9, -4.9, 0.0), at(50));
        assert_eq!(actions, vec![RotationAction::Stopped]);
        assert_eq!(rotation.current(), Ypr::ZERO);
    }

    #[test]
    fn neutral_sample_while_stopped_is_silent() {
        let at = clock();
        let mut rotation = RotationContinuation::<Instant>::new(RotationConfig::default());
        assert!(rotation.on_sample(Ypr::ZERO, at(0)).is_empty());
        assert_eq!(rotation.state(), RotationState::Stopped);
    }

    #[test]
    fn boundary_component_is_not_neutral() {
        let at = clock();
        let mut rotation = RotationContinuation::new(RotationConfig::default());
        let actions = rotation.on_sample(Ypr::new(5.0, 0.0, 0.0), at(0));
        assert!(matches!(actions.as_slice(), [RotationAction::Rotate(_)]));
    }

    #[test]
    fn late_sample_restarts_from_rest() {
        let at = clock();
        let mut rotation = RotationContinuation::new(RotationConfig::default());
        rotation.on_sample(Ypr::new(100.0, 0.0, 0.0), at(0));
        rotation.on_sample(Ypr::new(100.0, 0.0, 0.0), at(100));

        let actions = rotation.on_sample(Ypr::new(100.0, 0.0, 0.0), at(700));
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], RotationAction::Stopped);
        assert_eq!(actions[1], RotationAction::Rotate(Ypr::new(0.25, 0.0, 0.0)));
    }

    #[test]
    fn repeated_samples_stay_bounded() {
        let at = clock();
        let mut rotation = RotationContinuation::new(RotationConfig::default());

        for i in 0..200 {
            rotation.on_sample(Ypr::new(100.0, -100.0, 50.0), at(i * 10));
        }

        let current = rotation.current();
        assert!(current.yaw > 0.0 && current.yaw < 100.0);
        assert!(current.pitch < 0.0 && current.pitch > -100.0);
    }
}
