//! Gesture session state machine.
//!
//! Turns per-frame classifications into discrete [`GestureEvent`]s with
//! start/continue/end semantics. Uses the action pattern: [`process_frame`]
//! takes the frame and the current time and returns the events to send. No
//! I/O, no clock reads.
//!
//! # State Machine
//!
//! ```text
//!            fist / ControlStart            point / PointStart
//!   ┌──────┐ ─────────────────> ┌──────┐   ┌──────┐ <───────────────── ┌──────┐
//!   │ Idle │                    │ Fist │   │Point │                    │ Idle │
//!   └──────┘ <───────────────── └──────┘   └──────┘ ─────────────────> └──────┘
//!            released / ControlEnd          released / ControlEnd
//!
//!   Fist + fist   -> CameraRotate (pitch from clamped palm displacement)
//!   Point + point -> ObjectRotate (yaw/pitch from the pointing vector)
//! ```
//!
//! Transitions are checked in a fixed order, at most one per frame:
//! fist-start, fist-continue, control-end, point-start, point-continue.
//!
//! Pinch, finger tracking, pointing samples and movement vectors are
//! independent per-frame signals that share the same emission throttle.
//!
//! [`process_frame`]: GestureSession::process_frame

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use handlink_proto::{GestureEvent, MoveDirection, Position};

use crate::{
    classifier::{Classification, ClassifierConfig, GestureClassifier, GestureSignal},
    landmarks::LandmarkFrame,
};

/// Minimum spacing between processed frames (20 Hz).
pub const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum spacing between two pinch events.
pub const DEFAULT_PINCH_COOLDOWN: Duration = Duration::from_millis(500);

/// Multiplier applied to normalized palm displacement for `Vector` events.
pub const DEFAULT_VECTOR_SCALE: f64 = 5.0;

/// Multiplier applied to the unit pointing vector for `PointDir` events.
pub const DEFAULT_POINT_DIR_SCALE: f64 = 100.0;

/// How palm movement during a fist is reported, in addition to the camera
/// rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Camera rotation only
    #[default]
    Off,
    /// Continuous `Vector` events every processed frame
    Vector,
    /// `Move` events whenever the direction bucket changes
    Discrete,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Classifier thresholds and frame geometry
    pub classifier: ClassifierConfig,
    /// Emission throttle
    pub emit_interval: Duration,
    /// Pinch cooldown
    pub pinch_cooldown: Duration,
    /// Palm movement reporting while a fist is held
    pub movement_mode: MovementMode,
    /// Scale for `Vector` events
    pub vector_scale: f64,
    /// Scale for `PointDir` events
    pub point_dir_scale: f64,
    /// Emit `FingerTrack` for every processed frame with a hand
    pub emit_finger_tracking: bool,
    /// Emit `PointDir` samples while pointing
    pub emit_point_dir: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            emit_interval: DEFAULT_EMIT_INTERVAL,
            pinch_cooldown: DEFAULT_PINCH_COOLDOWN,
            movement_mode: MovementMode::Off,
            vector_scale: DEFAULT_VECTOR_SCALE,
            point_dir_scale: DEFAULT_POINT_DIR_SCALE,
            emit_finger_tracking: true,
            emit_point_dir: false,
        }
    }
}

/// Gesture currently driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveGesture {
    /// No control gesture in progress
    #[default]
    Idle,
    /// Fist held: camera control
    Fist,
    /// Pointing: object rotation
    Point,
}

/// Mutable session state.
#[derive(Debug, Clone)]
pub struct GestureState<I> {
    /// Control gesture in progress
    pub active: ActiveGesture,
    /// Palm center (pixels) when the fist closed
    pub anchor: Option<Position>,
    /// Last processed frame
    pub last_event_time: Option<I>,
    /// Last emitted pinch
    pub last_pinch_time: Option<I>,
    /// Last discrete direction sent while the fist is held
    pub last_direction: Option<MoveDirection>,
}

impl<I> GestureState<I> {
    /// True while a control gesture is in progress.
    pub fn control_active(&self) -> bool {
        self.active != ActiveGesture::Idle
    }
}

/// Per-client gesture session.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone)]
pub struct GestureSession<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    config: SessionConfig,
    classifier: GestureClassifier,
    state: GestureState<I>,
}

impl<I> GestureSession<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Self {
        let classifier = GestureClassifier::new(config.classifier.clone());
        Self {
            config,
            classifier,
            state: GestureState {
                active: ActiveGesture::Idle,
                anchor: None,
                last_event_time: None,
                last_pinch_time: None,
                last_direction: None,
            },
        }
    }

    /// Current state.
    pub fn state(&self) -> &GestureState<I> {
        &self.state
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Classifier used by this session.
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Process one provider frame (`None` when no hand was detected).
    ///
    /// Frames arriving faster than the emission interval are skipped
    /// entirely. Returns the events to send, in wire order.
    pub fn process_frame(&mut self, frame: Option<&LandmarkFrame>, now: I) -> Vec<GestureEvent> {
        if let Some(last) = self.state.last_event_time
            && now - last < self.config.emit_interval
        {
            return Vec::new();
        }
        self.state.last_event_time = Some(now);

        let Some(frame) = frame else {
            return self.end_control().into_iter().collect();
        };

        let classification = self.classifier.classify(frame);
        let mut events = Vec::new();

        if self.config.emit_finger_tracking && !classification.fingertips.is_empty() {
            events.push(GestureEvent::FingerTrack(classification.fingertips.clone()));
        }

        events.extend(self.advance(&classification));

        if let Some(point) = classification.pinch {
            let cooled = self
                .state
                .last_pinch_time
                .is_none_or(|last| now - last > self.config.pinch_cooldown);
            if cooled {
                let (x, y) = self.classifier.to_pixel_coords(point);
                events.push(GestureEvent::Pinch { x, y });
                self.state.last_pinch_time = Some(now);
            }
        }

        if self.config.emit_point_dir
            && let Some(v) = classification.pointing
        {
            let scale = self.config.point_dir_scale;
            events.push(GestureEvent::PointDir {
                x: (v.x * scale).trunc(),
                y: (v.y * scale).trunc(),
                z: (v.z * scale).trunc(),
            });
        }

        events.extend(self.movement(&classification));
        events
    }

    /// Apply the control state machine to one classification.
    fn advance(&mut self, classification: &Classification) -> Option<GestureEvent> {
        let palm = classification.palm_center;

        match (self.state.active, classification.signal()) {
            (ActiveGesture::Idle, Some(GestureSignal::Fist)) => {
                self.state.active = ActiveGesture::Fist;
                self.state.anchor = Some(palm);
                Some(GestureEvent::ControlStart { pos: palm })
            },
            (ActiveGesture::Fist, Some(GestureSignal::Fist)) => {
                let anchor = self.state.anchor.unwrap_or(palm);
                let (_, dy) = self.classifier.movement_vector(anchor, palm);
                let radius = self.classifier.config().control_radius;
                Some(GestureEvent::CameraRotate { yaw: 0.0, pitch: -dy / radius * 2.0, roll: 0.0 })
            },
            (ActiveGesture::Fist, _) | (ActiveGesture::Point, None | Some(GestureSignal::Fist)) => {
                self.end_control()
            },
            (ActiveGesture::Idle, Some(GestureSignal::Point(_))) => {
                self.state.active = ActiveGesture::Point;
                Some(GestureEvent::PointStart { pos: palm })
            },
            (ActiveGesture::Point, Some(GestureSignal::Point(v))) => {
                Some(GestureEvent::ObjectRotate { yaw: v.x * 2.0, pitch: -v.y * 2.0, roll: 0.0 })
            },
            (ActiveGesture::Idle, None) => None,
        }
    }

    /// Palm movement report while the fist is held.
    fn movement(&mut self, classification: &Classification) -> Option<GestureEvent> {
        if self.state.active != ActiveGesture::Fist {
            return None;
        }
        let anchor = self.state.anchor?;

        let config = self.classifier.config();
        let dx = (classification.palm_center.x - anchor.x) / f64::from(config.frame_width);
        let dy = (classification.palm_center.y - anchor.y) / f64::from(config.frame_height);

        match self.config.movement_mode {
            MovementMode::Off => None,
            MovementMode::Vector => {
                let scale = self.config.vector_scale;
                Some(GestureEvent::Vector {
                    dx: round_hundredths(dx * scale),
                    dy: round_hundredths(dy * scale),
                })
            },
            MovementMode::Discrete => {
                let dir = self.classifier.movement_direction(dx, dy);
                if self.state.last_direction == Some(dir) {
                    return None;
                }
                self.state.last_direction = Some(dir);
                Some(GestureEvent::Move { dir })
            },
        }
    }

    /// Return to idle, yielding `ControlEnd` if a gesture was active.
    fn end_control(&mut self) -> Option<GestureEvent> {
        if !self.state.control_active() {
            return None;
        }
        self.state.active = ActiveGesture::Idle;
        self.state.anchor = None;
        self.state.last_direction = None;
        Some(GestureEvent::ControlEnd)
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
