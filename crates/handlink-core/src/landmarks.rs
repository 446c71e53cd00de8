//! Hand landmark geometry.
//!
//! A hand is described by 21 points in the fixed anatomical numbering used
//! by common hand-tracking models: the wrist, then four joints per finger
//! from thumb to pinky. Coordinates are normalized to the camera frame
//! (`x`, `y` in `0.0..=1.0`, `y` growing downwards); `z` is relative depth.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of landmarks in a frame.
pub const LANDMARK_COUNT: usize = 21;

/// Wrist.
pub const WRIST: usize = 0;
/// Thumb CMC joint.
pub const THUMB_CMC: usize = 1;
/// Thumb MCP joint (knuckle).
pub const THUMB_MCP: usize = 2;
/// Thumb IP joint.
pub const THUMB_IP: usize = 3;
/// Thumb tip.
pub const THUMB_TIP: usize = 4;
/// Index MCP joint (knuckle).
pub const INDEX_MCP: usize = 5;
/// Index PIP joint.
pub const INDEX_PIP: usize = 6;
/// Index DIP joint.
pub const INDEX_DIP: usize = 7;
/// Index tip.
pub const INDEX_TIP: usize = 8;
/// Middle MCP joint (knuckle).
pub const MIDDLE_MCP: usize = 9;
/// Middle PIP joint.
pub const MIDDLE_PIP: usize = 10;
/// Middle DIP joint.
pub const MIDDLE_DIP: usize = 11;
/// Middle tip.
pub const MIDDLE_TIP: usize = 12;
/// Ring MCP joint (knuckle).
pub const RING_MCP: usize = 13;
/// Ring PIP joint.
pub const RING_PIP: usize = 14;
/// Ring DIP joint.
pub const RING_DIP: usize = 15;
/// Ring tip.
pub const RING_TIP: usize = 16;
/// Pinky MCP joint (knuckle).
pub const PINKY_MCP: usize = 17;
/// Pinky PIP joint.
pub const PINKY_PIP: usize = 18;
/// Pinky DIP joint.
pub const PINKY_DIP: usize = 19;
/// Pinky tip.
pub const PINKY_TIP: usize = 20;

/// Fingertips in finger-id order (thumb = 0 .. pinky = 4).
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Landmarks averaged to find the palm center.
pub const PALM: [usize; 6] = [WRIST, THUMB_CMC, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// 3D point or direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// Horizontal
    pub x: f64,
    /// Vertical (down is positive)
    pub y: f64,
    /// Depth
    #[serde(default)]
    pub z: f64,
}

/// A single tracked landmark.
pub type Landmark = Vec3;

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, `None` for the zero vector.
    pub fn normalized(self) -> Option<Self> {
        let length = self.length();
        (length > 0.0).then(|| Self::new(self.x / length, self.y / length, self.z / length))
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) * 0.5
    }

    /// True if every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// One video frame's worth of hand landmarks.
///
/// Immutable once built; owned by the classification call that reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Wrap a complete set of landmarks.
    pub const fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a frame from a provider's landmark list.
    ///
    /// # Errors
    ///
    /// - `CoreError::LandmarkCount` unless exactly 21 landmarks are given
    /// - `CoreError::NonFiniteLandmark` if any coordinate is NaN or infinite
    pub fn from_slice(landmarks: &[Landmark]) -> Result<Self, CoreError> {
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks.try_into().map_err(|_| CoreError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual: landmarks.len(),
            })?;

        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(CoreError::NonFiniteLandmark { index });
        }

        Ok(Self { landmarks })
    }

    /// Landmark at an anatomical index (see the constants in this module).
    pub fn get(&self, index: usize) -> Landmark {
        debug_assert!(index < LANDMARK_COUNT);
        self.landmarks[index]
    }

    /// All landmarks in anatomical order.
    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_wrong_count() {
        let points = vec![Vec3::ZERO; 20];
        assert_eq!(
            LandmarkFrame::from_slice(&points),
            Err(CoreError::LandmarkCount { expected: 21, actual: 20 })
        );
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut points = vec![Vec3::ZERO; LANDMARK_COUNT];
        points[7].y = f64::NAN;
        assert_eq!(
            LandmarkFrame::from_slice(&points),
            Err(CoreError::NonFiniteLandmark { index: 7 })
        );
    }

    #[test]
    fn normalized_zero_is_none() {
        assert_eq!(Vec3::ZERO.normalized(), None);
        assert_eq!(Vec3::new(0.0, -3.0, 4.0).normalized(), Some(Vec3::new(0.0, -0.6, 0.8)));
    }
}
