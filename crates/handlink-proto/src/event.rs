//! Gesture events produced by the tracking client.
//!
//! A [`GestureEvent`] is ephemeral: it is built by the session state machine
//! and consumed immediately by [`GestureEvent::encode`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Point in frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate (grows downwards)
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Discrete movement bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Hand moved left
    Left,
    /// Hand moved right
    Right,
    /// Hand moved up
    Up,
    /// Hand moved down
    Down,
    /// Inside the dead zone
    Center,
}

impl MoveDirection {
    /// Wire keyword.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Center => "CENTER",
        }
    }

    /// Parse a wire keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            "CENTER" => Some(Self::Center),
            _ => None,
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extrude (`Left`) or intrude (`Right`) the selected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeaceDirection {
    /// Grow the selected face
    Left,
    /// Shrink the selected face
    Right,
}

impl PeaceDirection {
    /// Wire keyword.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }

    /// Parse a wire keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for PeaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked fingertip in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FingerPosition {
    /// Finger id, 0 (thumb) through 4 (pinky)
    pub id: u32,
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

impl FingerPosition {
    /// Human-readable finger name for ids 0..=4.
    pub const fn name(&self) -> &'static str {
        match self.id {
            0 => "thumb",
            1 => "index",
            2 => "middle",
            3 => "ring",
            4 => "pinky",
            _ => "unknown",
        }
    }
}

/// Semantic gesture event emitted by a tracking session.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// Fist closed: camera control begins, anchored at the palm center
    ControlStart {
        /// Palm center when the fist closed
        pos: Position,
    },
    /// Active control gesture released
    ControlEnd,
    /// Camera orbit while the fist is held
    CameraRotate {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
    },
    /// Object rotation while pointing
    ObjectRotate {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
    },
    /// Pointing began at the palm center
    PointStart {
        /// Palm center when pointing began
        pos: Position,
    },
    /// Continuous movement vector
    Vector {
        /// Horizontal displacement
        dx: f64,
        /// Vertical displacement
        dy: f64,
    },
    /// Selection pinch at a pixel position
    Pinch {
        /// Horizontal pixel coordinate
        x: i32,
        /// Vertical pixel coordinate
        y: i32,
    },
    /// Pointing direction sample
    PointDir {
        /// X component
        x: f64,
        /// Y component
        y: f64,
        /// Z component
        z: f64,
    },
    /// Discrete move
    Move {
        /// Movement bucket
        dir: MoveDirection,
    },
    /// Extrude or intrude the selected face
    Peace {
        /// Extrusion direction
        dir: PeaceDirection,
    },
    /// Direct camera rotation
    Camera {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
    },
    /// Fingertip positions for the overlay
    FingerTrack(Vec<FingerPosition>),
    /// Raw command text forwarded to the host's command processor
    Create {
        /// Command text, must not contain a newline
        raw_command: String,
    },
}

impl GestureEvent {
    /// Short name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ControlStart { .. } => "ControlStart",
            Self::ControlEnd => "ControlEnd",
            Self::CameraRotate { .. } => "CameraRotate",
            Self::ObjectRotate { .. } => "ObjectRotate",
            Self::PointStart { .. } => "PointStart",
            Self::Vector { .. } => "Vector",
            Self::Pinch { .. } => "Pinch",
            Self::PointDir { .. } => "PointDir",
            Self::Move { .. } => "Move",
            Self::Peace { .. } => "Peace",
            Self::Camera { .. } => "Camera",
            Self::FingerTrack(_) => "FingerTrack",
            Self::Create { .. } => "Create",
        }
    }
}
