//! Synthetic reference hand poses.
//!
//! Builds landmark frames with chosen finger curls so a pipeline can be
//! driven without a camera: the client's scripted provider replays these
//! poses, and tests use them to hit exact classifier thresholds.
//!
//! Every pose shares the same palm (wrist, thumb CMC and finger knuckles),
//! so the palm center only moves when the pose is [`HandPose::shifted`].

use crate::landmarks::{
    INDEX_DIP, INDEX_MCP, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, Landmark, LandmarkFrame,
    MIDDLE_MCP, PINKY_MCP, RING_MCP, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, Vec3, WRIST,
};

/// Finger selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    /// Thumb
    Thumb,
    /// Index finger
    Index,
    /// Middle finger
    Middle,
    /// Ring finger
    Ring,
    /// Pinky
    Pinky,
}

impl Finger {
    /// All fingers, thumb first.
    pub const ALL: [Self; 5] = [Self::Thumb, Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// Landmark index of the MCP joint (CMC for the thumb).
    const fn base(self) -> usize {
        match self {
            Self::Thumb => THUMB_CMC,
            Self::Index => INDEX_MCP,
            Self::Middle => MIDDLE_MCP,
            Self::Ring => RING_MCP,
            Self::Pinky => PINKY_MCP,
        }
    }
}

/// Length of an extended finger segment from PIP to tip.
const EXTENDED_REACH: f64 = 0.2;

/// Hand pose builder.
#[derive(Debug, Clone, PartialEq)]
pub struct HandPose {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandPose {
    /// All five fingers extended, thumb spread away from the palm.
    pub fn open() -> Self {
        let mut pose = Self { landmarks: [Vec3::ZERO; LANDMARK_COUNT] };
        pose.landmarks[WRIST] = Vec3::new(0.50, 0.80, 0.0);
        pose.landmarks[THUMB_CMC] = Vec3::new(0.45, 0.75, 0.0);
        for finger in Finger::ALL {
            pose = pose.extend(finger);
        }
        pose
    }

    /// All five fingers curled.
    pub fn fist() -> Self {
        Finger::ALL.into_iter().fold(Self::open(), Self::curl)
    }

    /// Index extended straight up, middle/ring/pinky curled, thumb spread.
    pub fn pointing() -> Self {
        Self::open().curl(Finger::Middle).curl(Finger::Ring).curl(Finger::Pinky)
    }

    /// Open hand with thumb and index tips touching.
    pub fn pinch() -> Self {
        let index_tip = Self::open().landmarks[INDEX_TIP];
        Self::open().with_thumb_tip(index_tip + Vec3::new(0.02, 0.01, 0.0))
    }

    /// Extend one finger.
    #[must_use]
    pub fn extend(mut self, finger: Finger) -> Self {
        if finger == Finger::Thumb {
            self.landmarks[THUMB_MCP] = Vec3::new(0.40, 0.70, 0.0);
            self.landmarks[THUMB_IP] = Vec3::new(0.35, 0.65, 0.0);
            self.landmarks[THUMB_TIP] = Vec3::new(0.30, 0.60, 0.0);
            return self;
        }

        let base = finger.base();
        let x = finger_column(finger);
        self.landmarks[base] = Vec3::new(x, 0.60, 0.0);
        self.landmarks[base + 1] = Vec3::new(x, 0.50, 0.0);
        self.landmarks[base + 2] = Vec3::new(x, 0.40, 0.0);
        self.landmarks[base + 3] = Vec3::new(x, 0.30, 0.0);
        self
    }

    /// Curl one finger.
    ///
    /// A curled finger's tip sits below its knuckle and within 0.07 of its
    /// PIP joint; a curled thumb tucks its tip past the IP joint.
    #[must_use]
    pub fn curl(mut self, finger: Finger) -> Self {
        if finger == Finger::Thumb {
            self.landmarks[THUMB_MCP] = Vec3::new(0.42, 0.70, 0.0);
            self.landmarks[THUMB_IP] = Vec3::new(0.45, 0.66, 0.0);
            self.landmarks[THUMB_TIP] = Vec3::new(0.50, 0.64, 0.0);
            return self;
        }

        let base = finger.base();
        let x = finger_column(finger);
        self.landmarks[base] = Vec3::new(x, 0.60, 0.0);
        self.landmarks[base + 1] = Vec3::new(x, 0.58, 0.0);
        self.landmarks[base + 2] = Vec3::new(x, 0.62, 0.0);
        self.landmarks[base + 3] = Vec3::new(x, 0.65, 0.0);
        self
    }

    /// Aim the extended index finger along `direction`.
    ///
    /// A zero direction leaves the pose unchanged.
    #[must_use]
    pub fn point_toward(mut self, direction: Vec3) -> Self {
        let Some(unit) = direction.normalized() else {
            return self;
        };
        let pip = self.landmarks[INDEX_PIP];
        self.landmarks[INDEX_DIP] = pip + unit * (EXTENDED_REACH / 2.0);
        self.landmarks[INDEX_TIP] = pip + unit * EXTENDED_REACH;
        self
    }

    /// Place the thumb tip at an exact position.
    #[must_use]
    pub fn with_thumb_tip(mut self, tip: Vec3) -> Self {
        self.landmarks[THUMB_TIP] = tip;
        self
    }

    /// Translate the whole hand in the image plane.
    #[must_use]
    pub fn shifted(mut self, dx: f64, dy: f64) -> Self {
        for landmark in &mut self.landmarks {
            landmark.x += dx;
            landmark.y += dy;
        }
        self
    }

    /// Landmark at an anatomical index.
    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    /// Finish the pose.
    pub fn frame(&self) -> LandmarkFrame {
        LandmarkFrame::new(self.landmarks)
    }
}

/// Horizontal column of a finger's joints.
fn finger_column(finger: Finger) -> f64 {
    match finger {
        Finger::Thumb => 0.35,
        Finger::Index => 0.45,
        Finger::Middle => 0.50,
        Finger::Ring => 0.55,
        Finger::Pinky => 0.60,
    }
}
