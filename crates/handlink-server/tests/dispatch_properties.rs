//! Property-based tests for command dispatch and the in-memory scene.
//!
//! These verify invariants that must hold for all command sequences:
//! accepted pinches respect the cooldown, rotate mode only follows
//! `GESTURE:POINT`, and extrusion never shrinks a box below its minimum or
//! moves the face opposite the one being pushed.

use std::time::{Duration, Instant};

use handlink_core::Vec3;
use handlink_proto::{Command, PeaceDirection, Position};
use handlink_server::{
    CommandDispatcher, DispatcherConfig, MemoryScene, Scene, SceneAction,
    scene::{DEFAULT_OBJECT_NAME, Face, MIN_DIMENSION},
};
use proptest::prelude::*;

fn arbitrary_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0i32..640, 0i32..480).prop_map(|(x, y)| Command::Pinch { x, y }),
        Just(Command::GesturePoint { pos: Position::new(320.0, 240.0) }),
        Just(Command::GestureRotate { yaw: 1.0, pitch: -1.0, roll: 0.0 }),
        Just(Command::ControlEnd),
        Just(Command::Camera { yaw: 0.5, pitch: 0.0, roll: 0.0 }),
        Just(Command::FingerTrack(Vec::new())),
    ]
}

fn arbitrary_face() -> impl Strategy<Value = Face> {
    (0usize..6).prop_map(|i| Face::from_index(i).unwrap_or(Face::Front))
}

proptest! {
    #[test]
    fn prop_accepted_pinches_respect_cooldown(
        gaps in prop::collection::vec(0u64..1_000, 1..50),
    ) {
        #[allow(clippy::disallowed_methods)]
        let mut now = Instant::now();
        let mut dispatcher = CommandDispatcher::new(DispatcherConfig::default());
        let mut last_accepted: Option<Instant> = None;

        for gap in gaps {
            now += Duration::from_millis(gap);
            let accepted = dispatcher.dispatch(Command::Pinch { x: 1, y: 1 }, now).is_some();

            let expected = last_accepted.is_none_or(|last| now - last > Duration::from_millis(500));
            prop_assert_eq!(accepted, expected);
            if accepted {
                last_accepted = Some(now);
            }
        }
    }

    #[test]
    fn prop_rotate_mode_follows_point(
        commands in prop::collection::vec(arbitrary_command(), 1..60),
    ) {
        #[allow(clippy::disallowed_methods)]
        let now = Instant::now();
        let mut dispatcher = CommandDispatcher::new(DispatcherConfig::default());
        let mut armed = false;

        for command in commands {
            match &command {
                Command::GesturePoint { .. } => armed = true,
                Command::ControlEnd => armed = false,
                _ => {},
            }
            let is_rotate = matches!(command, Command::GestureRotate { .. });

            let action = dispatcher.dispatch(command, now);

            prop_assert_eq!(dispatcher.rotate_mode(), armed);
            if is_rotate {
                prop_assert_eq!(matches!(action, Some(SceneAction::RotateSelected(_))), armed);
            }
        }
    }

    #[test]
    fn prop_extrusion_keeps_opposite_face(
        face in arbitrary_face(),
        pushes in prop::collection::vec(
            prop_oneof![Just(PeaceDirection::Left), Just(PeaceDirection::Right)],
            1..80,
        ),
    ) {
        let mut scene = MemoryScene::new();
        let id = scene.find(DEFAULT_OBJECT_NAME).unwrap();
        scene.select(id, Some(face)).unwrap();

        let far_edge = |scene: &MemoryScene| {
            let object = scene.object(id).unwrap();
            let (position, dims) = (object.position, object.dimensions);
            match face {
                Face::Back => position.y + dims.length,
                Face::Front => position.y,
                Face::Left => position.x + dims.width,
                Face::Right => position.x,
                Face::Bottom => position.z + dims.height,
                Face::Top => position.z,
            }
        };
        let anchored = far_edge(&scene);

        for push in pushes {
            let delta = match push {
                PeaceDirection::Left => 0.5,
                PeaceDirection::Right => -0.5,
            };
            scene.extrude_selected_face(delta).unwrap();

            let dims = scene.object(id).unwrap().dimensions;
            prop_assert!(dims.length >= MIN_DIMENSION);
            prop_assert!(dims.width >= MIN_DIMENSION);
            prop_assert!(dims.height >= MIN_DIMENSION);
            prop_assert!((far_edge(&scene) - anchored).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_translation_is_additive(
        steps in prop::collection::vec((-10.0..10.0f64, -10.0..10.0f64, -10.0..10.0f64), 0..30),
    ) {
        let mut scene = MemoryScene::new();
        let id = scene.find(DEFAULT_OBJECT_NAME).unwrap();
        let mut expected = Vec3::ZERO;

        for (x, y, z) in steps {
            let delta = Vec3::new(x, y, z);
            scene.translate(id, delta).unwrap();
            expected = expected + delta;
        }

        prop_assert_eq!(scene.object(id).unwrap().position, expected);
    }
}
