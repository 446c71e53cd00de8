//! Property-based tests for rotation continuation.
//!
//! Arbitrary interleavings of samples and ticks must never leave a stopped
//! continuation holding rotation, never rotate on a neutral sample, and
//! never overshoot the largest target seen.

use std::time::{Duration, Instant};

use handlink_core::{RotationAction, RotationConfig, RotationContinuation, RotationState, Ypr};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Step {
    Sample(Ypr),
    Tick,
}

fn component() -> impl Strategy<Value = f64> {
    prop_oneof![-10.0..10.0f64, -100.0..100.0f64]
}

fn arbitrary_step() -> impl Strategy<Value = (Step, u64)> {
    let step = prop_oneof![
        (component(), component(), component())
            .prop_map(|(yaw, pitch, roll)| Step::Sample(Ypr::new(yaw, pitch, roll))),
        Just(Step::Tick),
    ];
    (step, 0u64..800)
}

proptest! {
    #[test]
    fn prop_rotation_invariants(steps in prop::collection::vec(arbitrary_step(), 1..80)) {
        #[allow(clippy::disallowed_methods)]
        let mut now = Instant::now();
        let mut rotation = RotationContinuation::new(RotationConfig::default());
        let mut bound: f64 = 0.0;

        for (step, gap_ms) in steps {
            now += Duration::from_millis(gap_ms);

            let actions = match step {
                Step::Sample(target) => {
                    let neutral = target.yaw.abs() < 5.0
                        && target.pitch.abs() < 5.0
                        && target.roll.abs() < 5.0;
                    let actions = rotation.on_sample(target, now);
                    if neutral {
                        prop_assert_eq!(rotation.state(), RotationState::Stopped);
                        prop_assert!(actions.iter().all(|a| *a == RotationAction::Stopped));
                    } else {
                        bound = bound
                            .max(target.yaw.abs())
                            .max(target.pitch.abs())
                            .max(target.roll.abs());
                        prop_assert_eq!(rotation.state(), RotationState::Rotating);
                    }
                    actions
                },
                Step::Tick => rotation.tick(now),
            };

            for action in actions {
                if let RotationAction::Rotate(step) = action {
                    prop_assert!(step.yaw.abs() <= bound);
                    prop_assert!(step.pitch.abs() <= bound);
                    prop_assert!(step.roll.abs() <= bound);
                }
            }

            if rotation.state() == RotationState::Stopped {
                prop_assert_eq!(rotation.current(), Ypr::ZERO);
            }
        }
    }
}
