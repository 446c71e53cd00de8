//! Handlink gesture core.
//!
//! Sans-IO logic shared by the tracking client, the scene host and the
//! simulation harness. Nothing here reads a clock or touches a socket: every
//! time-dependent method takes `now` as a parameter and every state machine
//! returns values for its driver to act on.
//!
//! # Components
//!
//! - [`GestureClassifier`]: per-frame pose predicates (fist, pointing, pinch)
//! - [`GestureSession`]: start/continue/end gesture events with throttling
//!   and cooldowns
//! - [`RotationContinuation`]: smoothed object rotation that expires when
//!   pointing samples stop
//! - [`env::Environment`]: clock abstraction for drivers
//! - [`poses`]: synthetic reference hands for replay and tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod env;
pub mod error;
pub mod landmarks;
pub mod poses;
pub mod rotation;
pub mod session;

pub use classifier::{Classification, ClassifierConfig, GestureClassifier, GestureSignal};
pub use error::CoreError;
pub use landmarks::{LANDMARK_COUNT, Landmark, LandmarkFrame, Vec3};
pub use rotation::{RotationAction, RotationConfig, RotationContinuation, RotationState, Ypr};
pub use session::{ActiveGesture, GestureSession, GestureState, MovementMode, SessionConfig};
