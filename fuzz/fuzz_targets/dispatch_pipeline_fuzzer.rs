//! Fuzz target for the server's decode, dispatch and apply pipeline
//!
//! Drives one connection's dispatcher and the shared scene hub with an
//! arbitrary command stream and clock, the way a connection task and the
//! rotation ticker interleave in production.
//!
//! # Strategy
//!
//! - Commands: well-formed lines of every kind with fuzzed values, plus
//!   raw text
//! - Time: arbitrary gaps between lines and ticks, so cooldowns and
//!   rotation staleness are crossed in both directions
//! - Scene churn: `CREATE` lines create, select and delete objects while
//!   rotations are running on them
//!
//! # Invariants
//!
//! - The pipeline NEVER panics; every failure is an error value
//! - Box dimensions never drop below `MIN_DIMENSION`
//! - After a tick, every rotating object still exists
//! - A finger-only dispatcher never produces a scene action

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use handlink_core::RotationConfig;
use handlink_proto::Command;
use handlink_server::{
    ChannelKind, CommandDispatcher, DispatcherConfig, MemoryScene, SceneHub,
    scene::MIN_DIMENSION,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Pinch { x: i16, y: i16 },
    PointDir { x: i8, y: i8, z: i8 },
    Peace { left: bool },
    Move { dir: u8 },
    Vector { dx: i8, dy: i8 },
    Camera { yaw: i8, pitch: i8 },
    Point,
    Rotate { yaw: i8 },
    ControlEnd,
    Create { verb: u8, name: u8, face: u8 },
    Raw(String),
    Wait { ms: u16 },
    Tick,
}

impl Op {
    fn line(&self) -> Option<String> {
        Some(match self {
            Self::Pinch { x, y } => format!("PINCH:{x},{y}"),
            Self::PointDir { x, y, z } => format!("POINT_DIR:{x},{y},{z}"),
            Self::Peace { left } => format!("PEACE:{}", if *left { "LEFT" } else { "RIGHT" }),
            Self::Move { dir } => {
                let dirs = ["LEFT", "RIGHT", "UP", "DOWN", "CENTER"];
                format!("MOVE:{}", dirs[usize::from(*dir) % dirs.len()])
            }
            Self::Vector { dx, dy } => format!("VECTOR:{dx},{dy}"),
            Self::Camera { yaw, pitch } => format!("CAMERA:{yaw},{pitch},0"),
            Self::Point => "GESTURE:POINT,320,240".to_string(),
            Self::Rotate { yaw } => format!("GESTURE:ROTATE,{yaw},0,0"),
            Self::ControlEnd => "CONTROL_END".to_string(),
            Self::Create { verb, name, face } => {
                let verbs = ["create box", "create cube", "select", "delete"];
                let verb = verbs[usize::from(*verb) % verbs.len()];
                let name = ["DefaultCube", "A", "B"][usize::from(*name) % 3];
                format!("CREATE:{verb} {name} Face{}", face % 8)
            }
            Self::Raw(text) => text.clone(),
            Self::Wait { .. } | Self::Tick => return None,
        })
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    ops: Vec<Op>,
    finger_only: bool,
}

fuzz_target!(|input: Input| {
    let mut now = Instant::now();

    let channel = if input.finger_only { ChannelKind::FingerOnly } else { ChannelKind::Command };
    let mut dispatcher =
        CommandDispatcher::new(DispatcherConfig { channel, ..DispatcherConfig::default() });
    let mut hub = SceneHub::new(MemoryScene::new(), RotationConfig::default());

    for op in &input.ops {
        match op {
            Op::Wait { ms } => now += Duration::from_millis(u64::from(*ms)),
            Op::Tick => {
                let _ = hub.tick(now);
                for id in hub.rotating() {
                    assert!(hub.scene().object(id).is_some(), "rotating a deleted object");
                }
            }
            _ => {}
        }

        let Some(line) = op.line() else {
            continue;
        };
        let Ok(command) = Command::decode(&line) else {
            continue;
        };

        let action = dispatcher.dispatch(command, now);
        if input.finger_only {
            assert!(action.is_none(), "finger-only channel produced {action:?}");
        }
        if let Some(action) = action {
            let _ = hub.apply(action, now);
        }

        for (_, object) in hub.scene().objects() {
            let d = &object.dimensions;
            assert!(
                d.length >= MIN_DIMENSION
                    && d.width >= MIN_DIMENSION
                    && d.height >= MIN_DIMENSION
            );
        }
    }
});
