//! Scene API and the in-memory scene.
//!
//! [`Scene`] is the seam between gesture dispatch and whatever owns the 3D
//! model. The host binary and the simulation harness both run on
//! [`MemoryScene`]; an embedding CAD application would implement the trait
//! over its own document.
//!
//! The in-memory scene models boxes only: each object has a placement, an
//! accumulated orientation, three dimensions and the rectangle it occupies
//! on screen. Pinch selection hit-tests those rectangles.

use std::{collections::BTreeMap, fmt};

use handlink_core::{Vec3, Ypr};

/// Edge length of boxes created without explicit dimensions.
pub const DEFAULT_BOX_SIZE: f64 = 20.0;

/// Smallest dimension an extrusion may shrink a box to.
pub const MIN_DIMENSION: f64 = 1.0;

/// Pitch and yaw components at or below this magnitude do not move the
/// camera.
pub const CAMERA_DEADZONE: f64 = 0.1;

/// Scale applied to pitch when tilting the view direction.
pub const CAMERA_PITCH_SCALE: f64 = 0.1;

/// Name of the object every new [`MemoryScene`] starts with.
pub const DEFAULT_OBJECT_NAME: &str = "DefaultCube";

/// Screen rectangle of the default object in a 640x480 view.
pub const DEFAULT_OBJECT_BOUNDS: ScreenRect = ScreenRect::new(220, 140, 200, 200);

/// Scene object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by scene operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// The operation needs a selected object and there is none.
    #[error("no object selected")]
    NothingSelected,

    /// The operation needs at least one object and the scene is empty.
    #[error("scene has no objects")]
    NoObjects,

    /// Extrusion needs a selected face, but the selection is a whole object.
    #[error("selection is not a face")]
    NotAFace,

    /// The object was removed or never existed.
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// The command processor could not run a command.
    #[error("command rejected: {command:?}: {reason}")]
    CommandRejected {
        /// Command text as received
        command: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Box dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// Extent along y (back to front)
    pub length: f64,
    /// Extent along x (left to right)
    pub width: f64,
    /// Extent along z (bottom to top)
    pub height: f64,
}

impl Dimensions {
    /// Cube with equal edges.
    pub const fn cube(size: f64) -> Self {
        Self { length: size, width: size, height: size }
    }
}

/// One face of a box, in the host's face numbering (0..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Face 0, minimum y
    Back,
    /// Face 1, maximum y
    Front,
    /// Face 2, maximum x
    Right,
    /// Face 3, minimum x
    Left,
    /// Face 4, maximum z
    Top,
    /// Face 5, minimum z
    Bottom,
}

impl Face {
    /// All faces in index order.
    pub const ALL: [Self; 6] =
        [Self::Back, Self::Front, Self::Right, Self::Left, Self::Top, Self::Bottom];

    /// Zero-based face index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Face for a zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse a one-based sub-element name such as `Face3`.
    pub fn from_element_name(name: &str) -> Option<Self> {
        let number: usize = name.strip_prefix("Face")?.parse().ok()?;
        Self::from_index(number.checked_sub(1)?)
    }

    /// True for faces on the minimum side of their axis. Growing or
    /// shrinking these moves the placement as well as the dimension.
    const fn is_min_side(self) -> bool {
        matches!(self, Self::Back | Self::Left | Self::Bottom)
    }
}

/// Axis-aligned rectangle in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl ScreenRect {
    /// A rectangle nothing can hit.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// True if the point lies inside (left/top edges inclusive).
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Face under a point inside the rectangle, for a box seen from the
    /// front: the top and bottom thirds hit the top and bottom faces, the
    /// outer thirds of the middle band hit the sides, the center hits the
    /// front.
    pub fn face_at(&self, x: i32, y: i32) -> Face {
        let column = (3 * (x - self.x)) / self.width.max(1);
        let row = (3 * (y - self.y)) / self.height.max(1);
        match (row, column) {
            (0, _) => Face::Top,
            (2, _) => Face::Bottom,
            (_, 0) => Face::Left,
            (_, 2) => Face::Right,
            _ => Face::Front,
        }
    }
}

/// A box in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Unique name
    pub name: String,
    /// Placement of the minimum corner
    pub position: Vec3,
    /// Accumulated yaw/pitch/roll in degrees
    pub rotation: Ypr,
    /// Box dimensions
    pub dimensions: Dimensions,
    /// Where the object is drawn
    pub screen_bounds: ScreenRect,
}

impl SceneObject {
    fn new_box(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Ypr::ZERO,
            dimensions: Dimensions::cube(DEFAULT_BOX_SIZE),
            screen_bounds: ScreenRect::EMPTY,
        }
    }

    /// Grow (positive) or shrink (negative) one face by `delta`.
    ///
    /// The affected dimension never drops below [`MIN_DIMENSION`]. Faces on
    /// the minimum side of their axis move the placement so the opposite
    /// face stays put.
    fn extrude(&mut self, face: Face, delta: f64) {
        let (dimension, coordinate) = match face {
            Face::Back | Face::Front => (&mut self.dimensions.length, &mut self.position.y),
            Face::Right | Face::Left => (&mut self.dimensions.width, &mut self.position.x),
            Face::Top | Face::Bottom => (&mut self.dimensions.height, &mut self.position.z),
        };

        let resized = (*dimension + delta).max(MIN_DIMENSION);
        let change = resized - *dimension;
        *dimension = resized;
        if face.is_min_side() {
            *coordinate -= change;
        }
    }
}

/// Current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Selected object
    pub object: ObjectId,
    /// Selected face, if the pick landed on one
    pub face: Option<Face>,
}

/// View camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Quarter turns around the vertical axis, 0..=3, positive is left
    pub heading: u8,
    /// Direction the camera looks along
    pub view_direction: Vec3,
}

impl Default for Camera {
    /// Isometric view.
    fn default() -> Self {
        Self { heading: 0, view_direction: Vec3::new(-1.0, 1.0, -1.0) }
    }
}

/// Operations the gesture pipeline performs on a scene.
///
/// Every method may fail; the caller logs failures and carries on.
pub trait Scene: Send + 'static {
    /// Currently selected object.
    fn selected(&self) -> Option<ObjectId>;

    /// Object that discrete moves fall back to when nothing is selected.
    fn default_object(&self) -> Option<ObjectId>;

    /// Translate an object.
    fn translate(&mut self, id: ObjectId, delta: Vec3) -> Result<(), SceneError>;

    /// Apply an incremental rotation to an object.
    fn rotate(&mut self, id: ObjectId, delta: Ypr) -> Result<(), SceneError>;

    /// Grow (positive) or shrink (negative) the selected face.
    fn extrude_selected_face(&mut self, delta: f64) -> Result<(), SceneError>;

    /// Select whatever is drawn at a view pixel, clearing the selection if
    /// nothing is.
    fn select_at(&mut self, x: i32, y: i32) -> Result<Option<ObjectId>, SceneError>;

    /// Orbit the view camera.
    fn orbit_camera(&mut self, yaw: f64, pitch: f64, roll: f64) -> Result<(), SceneError>;

    /// Hand command text to the scene's command processor.
    fn run_command(&mut self, text: &str) -> Result<(), SceneError>;
}

/// Scene held entirely in memory.
///
/// The command processor understands:
///
/// ```text
/// create box|cube [name]
/// select <name> [FaceN]
/// delete <name>
/// ```
#[derive(Debug, Clone)]
pub struct MemoryScene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u32,
    selection: Option<Selection>,
    camera: Camera,
    history: Vec<String>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Scene holding only the default 20x20x20 cube at the origin.
    pub fn new() -> Self {
        let mut scene = Self::empty();
        let id = scene.add_box(DEFAULT_OBJECT_NAME);
        if let Some(object) = scene.objects.get_mut(&id) {
            object.screen_bounds = DEFAULT_OBJECT_BOUNDS;
        }
        scene
    }

    /// Scene with no objects.
    pub fn empty() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            selection: None,
            camera: Camera::default(),
            history: Vec::new(),
        }
    }

    /// Add a default-sized box and return its id.
    pub fn add_box(&mut self, name: impl Into<String>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, SceneObject::new_box(name));
        id
    }

    /// Set where an object is drawn.
    pub fn place_on_screen(&mut self, id: ObjectId, bounds: ScreenRect) -> Result<(), SceneError> {
        self.object_mut(id)?.screen_bounds = bounds;
        Ok(())
    }

    /// Select an object directly, optionally one of its faces.
    pub fn select(&mut self, id: ObjectId, face: Option<Face>) -> Result<(), SceneError> {
        if !self.objects.contains_key(&id) {
            return Err(SceneError::UnknownObject(id));
        }
        self.selection = Some(Selection { object: id, face });
        Ok(())
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Look up an object.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Find an object by name.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().find(|(_, object)| object.name == name).map(|(&id, _)| id)
    }

    /// All objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(&id, object)| (id, object))
    }

    /// Current selection.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// View camera.
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Every command handed to [`Scene::run_command`], accepted or not.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject, SceneError> {
        self.objects.get_mut(&id).ok_or(SceneError::UnknownObject(id))
    }

    fn execute(&mut self, text: &str) -> Result<(), SceneError> {
        let reject = |reason| SceneError::CommandRejected { command: text.to_string(), reason };
        let words: Vec<&str> = text.split_whitespace().collect();

        match words.as_slice() {
            [verb, kind, rest @ ..] if verb.eq_ignore_ascii_case("create") => {
                if !(kind.eq_ignore_ascii_case("box") || kind.eq_ignore_ascii_case("cube")) {
                    return Err(reject("only boxes can be created"));
                }
                let name = match rest {
                    [] => format!("Box{:03}", self.next_id),
                    [name] => (*name).to_string(),
                    _ => return Err(reject("expected: create box [name]")),
                };
                if self.find(&name).is_some() {
                    return Err(reject("name already in use"));
                }
                self.add_box(name);
                Ok(())
            },
            [verb, name, face @ ..] if verb.eq_ignore_ascii_case("select") => {
                let id = self.find(name).ok_or_else(|| reject("no such object"))?;
                let face = match face {
                    [] => None,
                    [element] => {
                        Some(Face::from_element_name(element).ok_or_else(|| reject("bad face"))?)
                    },
                    _ => return Err(reject("expected: select <name> [FaceN]")),
                };
                self.select(id, face)
            },
            [verb, name] if verb.eq_ignore_ascii_case("delete") => {
                let id = self.find(name).ok_or_else(|| reject("no such object"))?;
                self.objects.remove(&id);
                if self.selection.is_some_and(|s| s.object == id) {
                    self.selection = None;
                }
                Ok(())
            },
            [] => Err(reject("empty command")),
            _ => Err(reject("unknown command")),
        }
    }
}

impl Scene for MemoryScene {
    fn selected(&self) -> Option<ObjectId> {
        self.selection.map(|s| s.object)
    }

    fn default_object(&self) -> Option<ObjectId> {
        self.objects.keys().next().copied()
    }

    fn translate(&mut self, id: ObjectId, delta: Vec3) -> Result<(), SceneError> {
        let object = self.object_mut(id)?;
        object.position = object.position + delta;
        Ok(())
    }

    fn rotate(&mut self, id: ObjectId, delta: Ypr) -> Result<(), SceneError> {
        let object = self.object_mut(id)?;
        object.rotation = Ypr::new(
            object.rotation.yaw + delta.yaw,
            object.rotation.pitch + delta.pitch,
            object.rotation.roll + delta.roll,
        );
        Ok(())
    }

    fn extrude_selected_face(&mut self, delta: f64) -> Result<(), SceneError> {
        let selection = self.selection.ok_or(SceneError::NothingSelected)?;
        let face = selection.face.ok_or(SceneError::NotAFace)?;
        self.object_mut(selection.object)?.extrude(face, delta);
        Ok(())
    }

    fn select_at(&mut self, x: i32, y: i32) -> Result<Option<ObjectId>, SceneError> {
        // Later objects draw on top.
        let hit = self
            .objects
            .iter()
            .rev()
            .find(|(_, object)| object.screen_bounds.contains(x, y))
            .map(|(&id, object)| Selection {
                object: id,
                face: Some(object.screen_bounds.face_at(x, y)),
            });

        self.selection = hit;
        Ok(hit.map(|s| s.object))
    }

    fn orbit_camera(&mut self, yaw: f64, pitch: f64, _roll: f64) -> Result<(), SceneError> {
        if yaw.abs() > CAMERA_DEADZONE {
            let turn = if yaw > 0.0 { 1 } else { 3 };
            self.camera.heading = (self.camera.heading + turn) % 4;
        }
        if pitch.abs() > CAMERA_DEADZONE {
            self.camera.view_direction.y += pitch * CAMERA_PITCH_SCALE;
        }
        Ok(())
    }

    fn run_command(&mut self, text: &str) -> Result<(), SceneError> {
        self.history.push(text.to_string());
        self.execute(text)
    }
}
