//! Decoded commands as seen by the scene host.
//!
//! A [`Command`] is what a received line means to the server. Several
//! [`GestureEvent`]s share a wire form (`ControlStart` travels as a zero
//! camera rotation with an anchor), so the mapping from events to commands
//! is many-to-one and lives in [`Command::from`].

use crate::event::{FingerPosition, GestureEvent, MoveDirection, PeaceDirection, Position};

/// Typed command decoded from one wire line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `GESTURE:CAMERA,yaw,pitch,roll[,x,y]`
    GestureCamera {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
        /// Visualizer anchor, present when five fields were sent
        anchor: Option<Position>,
    },
    /// `GESTURE:POINT,x,y`: arms rotate mode
    GesturePoint {
        /// Palm center in pixels
        pos: Position,
    },
    /// `GESTURE:ROTATE,yaw,pitch,roll`: rotates while rotate mode is armed
    GestureRotate {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
    },
    /// `CONTROL_END`
    ControlEnd,
    /// `CREATE:text`
    Create {
        /// Command text for the host's command processor
        raw_command: String,
    },
    /// `POINT_DIR:x,y,z` or its alias `POINT:x,y,z`
    PointDir {
        /// X component
        x: f64,
        /// Y component
        y: f64,
        /// Z component
        z: f64,
    },
    /// `VECTOR:dx,dy`
    Vector {
        /// Horizontal displacement
        dx: f64,
        /// Vertical displacement
        dy: f64,
    },
    /// `MOVE:dir`
    Move {
        /// Movement bucket
        dir: MoveDirection,
    },
    /// `PEACE:dir`
    Peace {
        /// Extrusion direction
        dir: PeaceDirection,
    },
    /// `CAMERA:yaw,pitch,roll`
    Camera {
        /// Yaw delta
        yaw: f64,
        /// Pitch delta
        pitch: f64,
        /// Roll delta
        roll: f64,
    },
    /// `PINCH:x,y`
    Pinch {
        /// Horizontal pixel coordinate
        x: i32,
        /// Vertical pixel coordinate
        y: i32,
    },
    /// Prefix-less `id,x,y;id,x,y;...`
    FingerTrack(Vec<FingerPosition>),
}

impl Command {
    /// Short name used in logs and errors.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GestureCamera { .. } => "GESTURE:CAMERA",
            Self::GesturePoint { .. } => "GESTURE:POINT",
            Self::GestureRotate { .. } => "GESTURE:ROTATE",
            Self::ControlEnd => "CONTROL_END",
            Self::Create { .. } => "CREATE",
            Self::PointDir { .. } => "POINT_DIR",
            Self::Vector { .. } => "VECTOR",
            Self::Move { .. } => "MOVE",
            Self::Peace { .. } => "PEACE",
            Self::Camera { .. } => "CAMERA",
            Self::Pinch { .. } => "PINCH",
            Self::FingerTrack(_) => "FINGERS",
        }
    }
}

impl From<&GestureEvent> for Command {
    fn from(event: &GestureEvent) -> Self {
        match event {
            GestureEvent::ControlStart { pos } => {
                Self::GestureCamera { yaw: 0.0, pitch: 0.0, roll: 0.0, anchor: Some(*pos) }
            },
            GestureEvent::ControlEnd => Self::ControlEnd,
            GestureEvent::CameraRotate { yaw, pitch, roll } => {
                Self::GestureCamera { yaw: *yaw, pitch: *pitch, roll: *roll, anchor: None }
            },
            GestureEvent::ObjectRotate { yaw, pitch, roll } => {
                Self::GestureRotate { yaw: *yaw, pitch: *pitch, roll: *roll }
            },
            GestureEvent::PointStart { pos } => Self::GesturePoint { pos: *pos },
            GestureEvent::Vector { dx, dy } => Self::Vector { dx: *dx, dy: *dy },
            GestureEvent::Pinch { x, y } => Self::Pinch { x: *x, y: *y },
            GestureEvent::PointDir { x, y, z } => Self::PointDir { x: *x, y: *y, z: *z },
            GestureEvent::Move { dir } => Self::Move { dir: *dir },
            GestureEvent::Peace { dir } => Self::Peace { dir: *dir },
            GestureEvent::Camera { yaw, pitch, roll } => {
                Self::Camera { yaw: *yaw, pitch: *pitch, roll: *roll }
            },
            GestureEvent::FingerTrack(fingers) => Self::FingerTrack(fingers.clone()),
            GestureEvent::Create { raw_command } => {
                Self::Create { raw_command: crate::codec::single_line(raw_command) }
            },
        }
    }
}
