//! Per-connection command dispatch.
//!
//! [`CommandDispatcher`] turns decoded [`Command`]s into at most one
//! [`SceneAction`] each. It owns the state that belongs to a single client
//! connection: the pinch cooldown, whether rotate mode is armed, and the
//! overlay the client's hand is drawn on. The shared scene is never touched
//! here; the connection task hands the returned action to the
//! [`SceneHub`](crate::SceneHub).
//!
//! Like the core state machines this is sans-IO: `now` is passed in.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use handlink_core::{Vec3, Ypr};
use handlink_proto::{Command, FingerPosition, MoveDirection, PeaceDirection, Position};

/// Minimum spacing between two accepted pinches on one connection.
pub const DEFAULT_PINCH_COOLDOWN: Duration = Duration::from_millis(500);

/// Distance a `MOVE:` command translates the target object.
pub const DEFAULT_MOVE_STEP: f64 = 5.0;

/// Amount a `PEACE:` command grows or shrinks the selected face.
pub const DEFAULT_EXTRUDE_STEP: f64 = 0.5;

/// Which listener a connection arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelKind {
    /// Full command channel: every command reaches the scene
    #[default]
    Command,
    /// Visualization only: finger tracking and pointing samples update the
    /// overlay, nothing reaches the scene
    FingerOnly,
}

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Pinch cooldown (a pinch must arrive strictly later than this after
    /// the last accepted one)
    pub pinch_cooldown: Duration,
    /// Listener kind
    pub channel: ChannelKind,
    /// `MOVE:` step size
    pub move_step: f64,
    /// `PEACE:` step size
    pub extrude_step: f64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pinch_cooldown: DEFAULT_PINCH_COOLDOWN,
            channel: ChannelKind::default(),
            move_step: DEFAULT_MOVE_STEP,
            extrude_step: DEFAULT_EXTRUDE_STEP,
        }
    }
}

/// A single Scene API call requested by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    /// Orbit the view camera
    OrbitCamera {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
    },
    /// Rotate the selected object by a fixed increment
    RotateSelected(Ypr),
    /// Feed a pointing sample into the selected object's rotation
    /// continuation
    PointSample(Ypr),
    /// Translate the selected object, or the default object if nothing is
    /// selected
    Translate(Vec3),
    /// Grow (positive) or shrink (negative) the selected face
    Extrude(f64),
    /// Select whatever is drawn at a view pixel
    SelectAt {
        /// Horizontal pixel coordinate
        x: i32,
        /// Vertical pixel coordinate
        y: i32,
    },
    /// Hand text to the scene's command processor
    RunCommand(String),
}

/// What the client's overlay shows. Purely observational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Where the active control gesture started
    pub anchor: Option<Position>,
    /// Latest fingertip positions
    pub fingers: Vec<FingerPosition>,
    /// Last accepted pinch point
    pub highlight: Option<(i32, i32)>,
    /// Latest pointing direction sample
    pub pointing: Option<Vec3>,
}

/// Per-connection command dispatcher.
#[derive(Debug, Clone)]
pub struct CommandDispatcher<I = Instant>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    config: DispatcherConfig,
    last_pinch: Option<I>,
    rotate_mode: bool,
    overlay: Overlay,
}

impl<I> CommandDispatcher<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a dispatcher for a fresh connection.
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config, last_pinch: None, rotate_mode: false, overlay: Overlay::default() }
    }

    /// Listener kind this dispatcher serves.
    pub fn channel(&self) -> ChannelKind {
        self.config.channel
    }

    /// True between `GESTURE:POINT` and `CONTROL_END`.
    pub fn rotate_mode(&self) -> bool {
        self.rotate_mode
    }

    /// Current overlay state.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Map one command to the scene call it requests, if any.
    ///
    /// Commands that only affect presentation (finger tracking, anchors,
    /// rotate-mode toggles) and commands suppressed by the pinch cooldown
    /// return `None`.
    pub fn dispatch(&mut self, command: Command, now: I) -> Option<SceneAction> {
        match self.config.channel {
            ChannelKind::Command => self.dispatch_command(command, now),
            ChannelKind::FingerOnly => {
                self.dispatch_visualization(command);
                None
            },
        }
    }

    fn dispatch_command(&mut self, command: Command, now: I) -> Option<SceneAction> {
        match command {
            Command::GestureCamera { yaw, pitch, roll, anchor } => {
                if anchor.is_some() {
                    self.overlay.anchor = anchor;
                }
                Some(SceneAction::OrbitCamera { yaw, pitch, roll })
            },
            Command::Camera { yaw, pitch, roll } => {
                Some(SceneAction::OrbitCamera { yaw, pitch, roll })
            },
            Command::GesturePoint { pos } => {
                self.rotate_mode = true;
                self.overlay.anchor = Some(pos);
                None
            },
            Command::GestureRotate { yaw, pitch, roll } => {
                self.rotate_mode.then_some(SceneAction::RotateSelected(Ypr::new(yaw, pitch, roll)))
            },
            Command::ControlEnd => {
                self.rotate_mode = false;
                self.overlay.anchor = None;
                None
            },
            Command::Create { raw_command } => Some(SceneAction::RunCommand(raw_command)),
            Command::PointDir { x, y, z } => {
                self.overlay.pointing = Some(Vec3::new(x, y, z));
                Some(SceneAction::PointSample(Ypr::new(x, y, z)))
            },
            Command::Vector { dx, dy } => Some(SceneAction::Translate(Vec3::new(dx, 0.0, -dy))),
            Command::Move { dir } => {
                let step = self.config.move_step;
                let delta = match dir {
                    MoveDirection::Left => Vec3::new(-step, 0.0, 0.0),
                    MoveDirection::Right => Vec3::new(step, 0.0, 0.0),
                    MoveDirection::Up => Vec3::new(0.0, 0.0, step),
                    MoveDirection::Down => Vec3::new(0.0, 0.0, -step),
                    MoveDirection::Center => return None,
                };
                Some(SceneAction::Translate(delta))
            },
            Command::Peace { dir } => {
                let step = self.config.extrude_step;
                Some(SceneAction::Extrude(match dir {
                    PeaceDirection::Left => step,
                    PeaceDirection::Right => -step,
                }))
            },
            Command::Pinch { x, y } => {
                if self.last_pinch.is_some_and(|last| now - last <= self.config.pinch_cooldown) {
                    return None;
                }
                self.last_pinch = Some(now);
                self.overlay.highlight = Some((x, y));
                Some(SceneAction::SelectAt { x, y })
            },
            Command::FingerTrack(fingers) => {
                self.overlay.fingers = fingers;
                None
            },
        }
    }

    fn dispatch_visualization(&mut self, command: Command) {
        match command {
            Command::FingerTrack(fingers) => self.overlay.fingers = fingers,
            Command::PointDir { x, y, z } => self.overlay.pointing = Some(Vec3::new(x, y, z)),
            _ => {},
        }
    }
}
