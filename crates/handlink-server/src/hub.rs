//! Single-writer owner of the shared scene.
//!
//! Every connection's dispatcher produces [`SceneAction`]s; the
//! [`SceneHub`] applies them to the [`Scene`] and keeps one
//! [`RotationContinuation`] per object that is being turned by pointing
//! samples. The server wraps the hub in a `tokio::sync::Mutex` so scene
//! mutation is serialized across connections and the rotation ticker.

use std::{
    collections::HashMap,
    ops::Sub,
    sync::Arc,
    time::{Duration, Instant},
};

use handlink_core::{RotationAction, RotationConfig, RotationContinuation, RotationState, Ypr};

use crate::{
    dispatcher::SceneAction,
    scene::{ObjectId, Scene, SceneError},
};

/// Hub shared between connection tasks and the rotation ticker.
pub type SharedHub<S, I = Instant> = Arc<tokio::sync::Mutex<SceneHub<S, I>>>;

/// Scene plus the rotation continuations running on its objects.
pub struct SceneHub<S, I = Instant>
where
    S: Scene,
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    scene: S,
    rotation: RotationConfig,
    rotations: HashMap<ObjectId, RotationContinuation<I>>,
}

impl<S, I> SceneHub<S, I>
where
    S: Scene,
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a hub around a scene.
    pub fn new(scene: S, rotation: RotationConfig) -> Self {
        Self { scene, rotation, rotations: HashMap::new() }
    }

    /// Wrap in the shared handle used by the server.
    pub fn shared(self) -> SharedHub<S, I> {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// The scene.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable access to the scene, for setup outside the gesture pipeline.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Objects currently turning under a rotation continuation.
    pub fn rotating(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.rotations
            .iter()
            .filter(|(_, rotation)| rotation.state() == RotationState::Rotating)
            .map(|(&id, _)| id)
    }

    /// Apply one action to the scene.
    pub fn apply(&mut self, action: SceneAction, now: I) -> Result<(), SceneError> {
        match action {
            SceneAction::OrbitCamera { yaw, pitch, roll } => {
                self.scene.orbit_camera(yaw, pitch, roll)
            },
            SceneAction::RotateSelected(delta) => {
                let id = self.scene.selected().ok_or(SceneError::NothingSelected)?;
                self.scene.rotate(id, delta)
            },
            SceneAction::PointSample(target) => self.point_sample(target, now),
            SceneAction::Translate(delta) => {
                let id = self
                    .scene
                    .selected()
                    .or_else(|| self.scene.default_object())
                    .ok_or(SceneError::NoObjects)?;
                self.scene.translate(id, delta)
            },
            SceneAction::Extrude(delta) => self.scene.extrude_selected_face(delta),
            SceneAction::SelectAt { x, y } => self.scene.select_at(x, y).map(|_| ()),
            SceneAction::RunCommand(text) => self.scene.run_command(&text),
        }
    }

    /// Advance every running rotation.
    ///
    /// Stale rotations stop; the rest take one smoothing step. Continuations
    /// whose object has gone away are dropped and reported.
    pub fn tick(&mut self, now: I) -> Vec<(ObjectId, SceneError)> {
        let mut failures = Vec::new();

        for (&id, rotation) in &mut self.rotations {
            for action in rotation.tick(now) {
                if let RotationAction::Rotate(step) = action
                    && let Err(e) = self.scene.rotate(id, step)
                {
                    failures.push((id, e));
                }
            }
        }

        self.rotations.retain(|id, rotation| {
            rotation.state() == RotationState::Rotating
                && !failures.iter().any(|(failed, _)| failed == id)
        });

        failures
    }

    fn point_sample(&mut self, target: Ypr, now: I) -> Result<(), SceneError> {
        let id = self.scene.selected().ok_or(SceneError::NothingSelected)?;
        let rotation = self
            .rotations
            .entry(id)
            .or_insert_with(|| RotationContinuation::new(self.rotation.clone()));

        for action in rotation.on_sample(target, now) {
            if let RotationAction::Rotate(step) = action
                && let Err(e) = self.scene.rotate(id, step)
            {
                self.rotations.remove(&id);
                return Err(e);
            }
        }

        if self.rotations.get(&id).is_some_and(|r| r.state() == RotationState::Stopped) {
            self.rotations.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use handlink_core::Vec3;

    use super::*;
    use crate::scene::{DEFAULT_OBJECT_NAME, MemoryScene};

    fn clock() -> impl Fn(u64) -> Instant {
        #[allow(clippy::disallowed_methods)]
        let base = Instant::now();
        move |ms| base + Duration::from_millis(ms)
    }

    fn hub_with_selection() -> (SceneHub<MemoryScene>, ObjectId) {
        let mut scene = MemoryScene::new();
        let id = scene.find(DEFAULT_OBJECT_NAME).unwrap();
        scene.select(id, None).unwrap();
        (SceneHub::new(scene, RotationConfig::default()), id)
    }

    #[test]
    fn point_sample_needs_selection() {
        let at = clock();
        let mut hub = SceneHub::new(MemoryScene::new(), RotationConfig::default());

        let result = hub.apply(SceneAction::PointSample(Ypr::new(100.0, 0.0, 0.0)), at(0));

        assert_eq!(result, Err(SceneError::NothingSelected));
        assert_eq!(hub.rotating().count(), 0);
    }

    #[test]
    fn point_sample_rotates_selected_object() {
        let at = clock();
        let (mut hub, id) = hub_with_selection();

        hub.apply(SceneAction::PointSample(Ypr::new(100.0, 0.0, 0.0)), at(0)).unwrap();

        let rotation = hub.scene().object(id).unwrap().rotation;
        assert!((rotation.yaw - 0.25).abs() < 1e-12);
        assert_eq!(hub.rotating().collect::<Vec<_>>(), vec![id]);
    }

    #[test]
    fn ticker_continues_then_expires() {
        let at = clock();
        let (mut hub, id) = hub_with_selection();
        hub.apply(SceneAction::PointSample(Ypr::new(100.0, 0.0, 0.0)), at(0)).unwrap();

        assert!(hub.tick(at(100)).is_empty());
        let turned = hub.scene().object(id).unwrap().rotation.yaw;
        assert!(turned > 0.25);

        assert!(hub.tick(at(600)).is_empty());
        assert_eq!(hub.rotating().count(), 0);
        assert_eq!(hub.scene().object(id).unwrap().rotation.yaw, turned);
    }

    #[test]
    fn neutral_sample_stops_rotation() {
        let at = clock();
        let (mut hub, _) = hub_with_selection();
        hub.apply(SceneAction::PointSample(Ypr::new(0.0, -100.0, 0.0)), at(0)).unwrap();

        hub.apply(SceneAction::PointSample(Ypr::new(1.0, 2.0, -3.0)), at(50)).unwrap();

        assert_eq!(hub.rotating().count(), 0);
    }

    #[test]
    fn deleted_object_drops_its_rotation() {
        let at = clock();
        let (mut hub, id) = hub_with_selection();
        hub.apply(SceneAction::PointSample(Ypr::new(100.0, 0.0, 0.0)), at(0)).unwrap();

        hub.apply(SceneAction::RunCommand(format!("delete {DEFAULT_OBJECT_NAME}")), at(10))
            .unwrap();

        assert_eq!(hub.tick(at(50)), vec![(id, SceneError::UnknownObject(id))]);
        assert_eq!(hub.rotating().count(), 0);
    }

    #[test]
    fn translate_falls_back_to_default_object() {
        let at = clock();
        let mut hub = SceneHub::new(MemoryScene::new(), RotationConfig::default());

        hub.apply(SceneAction::Translate(Vec3::new(5.0, 0.0, 0.0)), at(0)).unwrap();

        let id = hub.scene().find(DEFAULT_OBJECT_NAME).unwrap();
        assert_eq!(hub.scene().object(id).unwrap().position, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn translate_in_empty_scene_fails() {
        let at = clock();
        let mut hub = SceneHub::<_, Instant>::new(MemoryScene::empty(), RotationConfig::default());

        assert_eq!(
            hub.apply(SceneAction::Translate(Vec3::ZERO), at(0)),
            Err(SceneError::NoObjects)
        );
    }

    #[test]
    fn rotate_selected_requires_selection() {
        let at = clock();
        let mut hub = SceneHub::new(MemoryScene::new(), RotationConfig::default());

        assert_eq!(
            hub.apply(SceneAction::RotateSelected(Ypr::new(0.0, 2.0, 0.0)), at(0)),
            Err(SceneError::NothingSelected)
        );
    }
}
