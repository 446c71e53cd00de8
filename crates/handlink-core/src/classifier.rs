//! Per-frame hand pose analysis.
//!
//! [`GestureClassifier`] is stateless per call: it reads one
//! [`LandmarkFrame`] and reports which gesture predicates hold, where the
//! palm is, and which fingertips are on screen. Everything that depends on
//! history (anchors, cooldowns, start/continue/end) lives in
//! [`crate::session`].
//!
//! # Predicates
//!
//! - **Fist**: at least [`FIST_MIN_CURLED`] of five curl tests hold. A
//!   non-thumb finger is curled when its tip is below its knuckle
//!   (`tip.y > mcp.y`); the thumb is curled when its tip has crossed its IP
//!   joint (`tip.x > ip.x`).
//! - **Pointing**: index extended (tip-to-PIP distance above
//!   `extended_threshold`) while middle, ring and pinky are curled
//!   (tip-to-PIP distance below `curled_threshold`).
//! - **Pinch**: thumb tip and index tip closer than `pinch_threshold`.
//!
//! A frame can satisfy fist and pointing at once (a pointing hand with the
//! thumb tucked). [`Classification::signal`] resolves this in favour of the
//! fist.

use handlink_proto::{FingerPosition, MoveDirection, Position};

use crate::landmarks::{
    FINGERTIPS, INDEX_MCP, INDEX_PIP, INDEX_TIP, LandmarkFrame, MIDDLE_MCP, MIDDLE_PIP,
    MIDDLE_TIP, PALM, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_MCP, RING_PIP, RING_TIP, THUMB_IP,
    THUMB_TIP, Vec3,
};

/// Camera frame width assumed when converting to pixels.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;

/// Camera frame height assumed when converting to pixels.
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Thumb-to-index distance below which the hand is pinching.
pub const DEFAULT_PINCH_THRESHOLD: f64 = 0.05;

/// Index tip-to-PIP distance above which the index counts as extended.
pub const DEFAULT_EXTENDED_THRESHOLD: f64 = 0.1;

/// Tip-to-PIP distance below which a finger counts as curled.
pub const DEFAULT_CURLED_THRESHOLD: f64 = 0.12;

/// Radius, in pixels, that palm displacement is clamped to.
pub const DEFAULT_CONTROL_RADIUS: f64 = 100.0;

/// Horizontal movement threshold for direction bucketing.
pub const DEFAULT_THRESHOLD_X: f64 = 0.1;

/// Upward movement threshold for direction bucketing.
pub const DEFAULT_THRESHOLD_Y_UP: f64 = 0.1;

/// Downward movement threshold for direction bucketing.
pub const DEFAULT_THRESHOLD_Y_DOWN: f64 = 0.25;

/// Minimum number of curled fingers for a fist.
pub const FIST_MIN_CURLED: usize = 4;

/// Classifier thresholds and frame geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Frame width in pixels
    pub frame_width: u32,
    /// Frame height in pixels
    pub frame_height: u32,
    /// Pinch distance threshold (strict)
    pub pinch_threshold: f64,
    /// Index extension threshold
    pub extended_threshold: f64,
    /// Finger curl threshold
    pub curled_threshold: f64,
    /// Control circle radius in pixels
    pub control_radius: f64,
    /// Horizontal bucketing threshold; RIGHT triggers at a fifth of it
    pub threshold_x: f64,
    /// Upward bucketing threshold
    pub threshold_y_up: f64,
    /// Downward bucketing threshold; DOWN triggers at a fifth of it
    pub threshold_y_down: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            extended_threshold: DEFAULT_EXTENDED_THRESHOLD,
            curled_threshold: DEFAULT_CURLED_THRESHOLD,
            control_radius: DEFAULT_CONTROL_RADIUS,
            threshold_x: DEFAULT_THRESHOLD_X,
            threshold_y_up: DEFAULT_THRESHOLD_Y_UP,
            threshold_y_down: DEFAULT_THRESHOLD_Y_DOWN,
        }
    }
}

/// Resolved gesture for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSignal {
    /// Closed fist
    Fist,
    /// Index pointing along the contained unit vector
    Point(Vec3),
}

/// Everything the classifier read from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Fist predicate
    pub fist: bool,
    /// Unit pointing vector when the pointing predicate holds
    pub pointing: Option<Vec3>,
    /// Normalized pinch point (thumb/index midpoint) when pinching
    pub pinch: Option<Vec3>,
    /// Palm center in pixels
    pub palm_center: Position,
    /// Fingertips inside the frame, in pixels
    pub fingertips: Vec<FingerPosition>,
}

impl Classification {
    /// The single gesture this frame signals, fist first.
    pub fn signal(&self) -> Option<GestureSignal> {
        if self.fist {
            return Some(GestureSignal::Fist);
        }
        self.pointing.map(GestureSignal::Point)
    }
}

/// Stateless landmark classifier.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Run every predicate over one frame.
    pub fn classify(&self, frame: &LandmarkFrame) -> Classification {
        Classification {
            fist: self.is_fist(frame),
            pointing: self.pointing_vector(frame),
            pinch: self.pinch_point(frame),
            palm_center: self.to_pixels(self.palm_center(frame)),
            fingertips: self.fingertips(frame),
        }
    }

    /// Curl test results, thumb first.
    pub fn curled_fingers(&self, frame: &LandmarkFrame) -> [bool; 5] {
        let below_knuckle = |tip: usize, mcp: usize| frame.get(tip).y > frame.get(mcp).y;

        [
            frame.get(THUMB_TIP).x > frame.get(THUMB_IP).x,
            below_knuckle(INDEX_TIP, INDEX_MCP),
            below_knuckle(MIDDLE_TIP, MIDDLE_MCP),
            below_knuckle(RING_TIP, RING_MCP),
            below_knuckle(PINKY_TIP, PINKY_MCP),
        ]
    }

    /// True if at least [`FIST_MIN_CURLED`] fingers are curled.
    pub fn is_fist(&self, frame: &LandmarkFrame) -> bool {
        self.curled_fingers(frame).iter().filter(|&&curled| curled).count() >= FIST_MIN_CURLED
    }

    /// Unit vector from index PIP to index tip, if the hand is pointing.
    ///
    /// A pointing hand whose tip coincides with its PIP (degenerate input)
    /// yields the zero vector.
    pub fn pointing_vector(&self, frame: &LandmarkFrame) -> Option<Vec3> {
        let reach = |tip: usize, pip: usize| frame.get(tip).distance(frame.get(pip));

        let index_extended = reach(INDEX_TIP, INDEX_PIP) > self.config.extended_threshold;
        let others_curled = [(MIDDLE_TIP, MIDDLE_PIP), (RING_TIP, RING_PIP), (PINKY_TIP, PINKY_PIP)]
            .into_iter()
            .all(|(tip, pip)| reach(tip, pip) < self.config.curled_threshold);

        if !(index_extended && others_curled) {
            return None;
        }

        let direction = frame.get(INDEX_TIP) - frame.get(INDEX_PIP);
        Some(direction.normalized().unwrap_or(Vec3::ZERO))
    }

    /// Thumb/index midpoint (normalized) if the tips are closer than the
    /// pinch threshold.
    pub fn pinch_point(&self, frame: &LandmarkFrame) -> Option<Vec3> {
        let thumb = frame.get(THUMB_TIP);
        let index = frame.get(INDEX_TIP);
        (thumb.distance(index) < self.config.pinch_threshold).then(|| thumb.midpoint(index))
    }

    /// Normalized palm center: mean of the wrist and the finger bases.
    pub fn palm_center(&self, frame: &LandmarkFrame) -> Position {
        let (x, y) = PALM
            .iter()
            .map(|&i| frame.get(i))
            .fold((0.0, 0.0), |(x, y), l| (x + l.x, y + l.y));
        let n = PALM.len() as f64;
        Position::new(x / n, y / n)
    }

    /// Fingertips inside the frame, in whole pixels, finger id order.
    pub fn fingertips(&self, frame: &LandmarkFrame) -> Vec<FingerPosition> {
        let width = f64::from(self.config.frame_width);
        let height = f64::from(self.config.frame_height);

        FINGERTIPS
            .iter()
            .zip(0u32..)
            .filter_map(|(&index, id)| {
                let tip = frame.get(index);
                let x = (tip.x * width).trunc();
                let y = (tip.y * height).trunc();
                ((0.0..width).contains(&x) && (0.0..height).contains(&y))
                    .then_some(FingerPosition { id, x, y })
            })
            .collect()
    }

    /// Convert a normalized position to pixels.
    pub fn to_pixels(&self, normalized: Position) -> Position {
        Position::new(
            normalized.x * f64::from(self.config.frame_width),
            normalized.y * f64::from(self.config.frame_height),
        )
    }

    /// Convert a normalized point to truncated integer pixels.
    pub fn to_pixel_coords(&self, normalized: Vec3) -> (i32, i32) {
        let pixels = self.to_pixels(Position::new(normalized.x, normalized.y));
        (pixels.x as i32, pixels.y as i32)
    }

    /// Displacement from `anchor` to `current` (pixels), clamped to the
    /// control circle with its direction preserved.
    pub fn movement_vector(&self, anchor: Position, current: Position) -> (f64, f64) {
        let dx = current.x - anchor.x;
        let dy = current.y - anchor.y;
        let distance = dx.hypot(dy);
        let radius = self.config.control_radius;

        if distance > radius {
            (dx * radius / distance, dy * radius / distance)
        } else {
            (dx, dy)
        }
    }

    /// Bucket a normalized displacement into a discrete direction.
    ///
    /// The dominant axis decides (ties go to the vertical axis). Thresholds
    /// are asymmetric: rightward and downward motion trigger at a fifth of
    /// their configured threshold.
    pub fn movement_direction(&self, dx: f64, dy: f64) -> MoveDirection {
        let config = &self.config;

        if dx.abs() > dy.abs() {
            if dx > config.threshold_x / 5.0 {
                return MoveDirection::Right;
            }
            if dx < -config.threshold_x {
                return MoveDirection::Left;
            }
        } else {
            if dy < -config.threshold_y_up {
                return MoveDirection::Up;
            }
            if dy > config.threshold_y_down / 5.0 {
                return MoveDirection::Down;
            }
        }

        MoveDirection::Center
    }
}
