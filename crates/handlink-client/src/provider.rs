//! Landmark providers.
//!
//! A [`LandmarkProvider`] yields one [`Capture`] per camera frame: either a
//! hand's 21 landmarks or "no hand". Hand detection itself is outside this
//! crate; providers here replay recorded sessions ([`ReplayProvider`]) or
//! play back synthetic poses ([`ScriptedProvider`]).
//!
//! # Recording format
//!
//! Recordings are CBOR-encoded [`Recording`] values:
//!
//! ```text
//! Recording {
//!     frame_interval_ms: u64,
//!     frames: [ RecordedFrame { landmarks: null | [ {x, y, z}; 21 ] } ],
//! }
//! ```

use std::{collections::VecDeque, fs::File, io, path::Path};

use handlink_core::{LandmarkFrame, Vec3, poses::HandPose};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Frame interval assumed for recordings and scripts (about 30 fps).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;

/// What a provider saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    /// A hand was detected
    Hand(LandmarkFrame),
    /// No hand in view
    NoHand,
}

impl Capture {
    /// The landmarks, if a hand was detected.
    pub fn frame(&self) -> Option<&LandmarkFrame> {
        match self {
            Self::Hand(frame) => Some(frame),
            Self::NoHand => None,
        }
    }
}

/// Source of hand landmark frames.
pub trait LandmarkProvider: Send {
    /// Next capture, or `None` when the source is exhausted.
    fn next_capture(&mut self) -> Option<Result<Capture, ProviderError>>;
}

/// One frame of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Landmarks in index order, absent when no hand was detected
    pub landmarks: Option<Vec<Vec3>>,
}

impl From<&Capture> for RecordedFrame {
    fn from(capture: &Capture) -> Self {
        Self { landmarks: capture.frame().map(|frame| frame.landmarks().to_vec()) }
    }
}

/// A recorded tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Time between frames when recorded
    pub frame_interval_ms: u64,
    /// Frames in capture order
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Record a sequence of captures.
    pub fn from_captures<'a>(captures: impl IntoIterator<Item = &'a Capture>) -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            frames: captures.into_iter().map(RecordedFrame::from).collect(),
        }
    }

    /// Decode a recording from CBOR.
    pub fn from_reader(reader: impl io::Read) -> Result<Self, ProviderError> {
        ciborium::de::from_reader(reader).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Encode this recording as CBOR.
    pub fn to_writer(&self, writer: impl io::Write) -> Result<(), ProviderError> {
        ciborium::ser::into_writer(self, writer).map_err(|e| ProviderError::Encode(e.to_string()))
    }

    /// Read a recording file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        Self::from_reader(io::BufReader::new(File::open(path)?))
    }

    /// Write a recording file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProviderError> {
        let mut writer = io::BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        io::Write::flush(&mut writer)?;
        Ok(())
    }
}

/// Replays a [`Recording`].
///
/// Frames that fail validation are reported individually; the rest of the
/// recording still plays.
#[derive(Debug)]
pub struct ReplayProvider {
    frames: std::vec::IntoIter<RecordedFrame>,
    index: usize,
    frame_interval_ms: u64,
}

impl ReplayProvider {
    /// Replay an in-memory recording.
    pub fn new(recording: Recording) -> Self {
        Self {
            frames: recording.frames.into_iter(),
            index: 0,
            frame_interval_ms: recording.frame_interval_ms,
        }
    }

    /// Open a recording file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        Ok(Self::new(Recording::load(path)?))
    }

    /// Frame interval stored in the recording.
    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }
}

impl LandmarkProvider for ReplayProvider {
    fn next_capture(&mut self) -> Option<Result<Capture, ProviderError>> {
        let frame = self.frames.next()?;
        let index = self.index;
        self.index += 1;

        Some(match frame.landmarks {
            None => Ok(Capture::NoHand),
            Some(landmarks) => LandmarkFrame::from_slice(&landmarks)
                .map(Capture::Hand)
                .map_err(|source| ProviderError::Frame { index, source }),
        })
    }
}

/// Plays back a fixed list of captures.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    captures: VecDeque<Capture>,
}

impl ScriptedProvider {
    /// Play `captures` in order.
    pub fn new(captures: impl IntoIterator<Item = Capture>) -> Self {
        Self { captures: captures.into_iter().collect() }
    }

    /// Append `count` copies of a pose.
    #[must_use]
    pub fn hold(mut self, pose: &HandPose, count: usize) -> Self {
        let frame = pose.frame();
        self.captures.extend(std::iter::repeat_n(Capture::Hand(frame), count));
        self
    }

    /// Append `count` frames without a hand.
    #[must_use]
    pub fn absent(mut self, count: usize) -> Self {
        self.captures.extend(std::iter::repeat_n(Capture::NoHand, count));
        self
    }

    /// Append a pose moving in `steps` equal increments by `(dx, dy)`
    /// overall.
    #[must_use]
    pub fn drag(mut self, pose: &HandPose, dx: f64, dy: f64, steps: usize) -> Self {
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            self.captures.push_back(Capture::Hand(pose.clone().shifted(dx * t, dy * t).frame()));
        }
        self
    }

    /// A short tour of every gesture: open hand, fist drag, point, pinch,
    /// hand lost.
    pub fn demo() -> Self {
        let pointing_up_right = HandPose::pointing().point_toward(Vec3::new(0.6, -0.8, 0.0));

        Self::default()
            .hold(&HandPose::open(), 10)
            .hold(&HandPose::fist(), 3)
            .drag(&HandPose::fist(), 0.0, -0.1, 10)
            .hold(&HandPose::open(), 5)
            .hold(&HandPose::pointing(), 5)
            .hold(&pointing_up_right, 10)
            .hold(&HandPose::open(), 5)
            .hold(&HandPose::pinch(), 3)
            .hold(&HandPose::open(), 5)
            .absent(5)
    }

    /// Captures left to play.
    pub fn remaining(&self) -> usize {
        self.captures.len()
    }

    /// Every remaining capture, in order, without consuming them.
    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.captures.iter()
    }
}

impl LandmarkProvider for ScriptedProvider {
    fn next_capture(&mut self) -> Option<Result<Capture, ProviderError>> {
        self.captures.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use handlink_core::{CoreError, LANDMARK_COUNT};

    use super::*;

    #[test]
    fn recording_survives_a_file() {
        let script = ScriptedProvider::default().hold(&HandPose::fist(), 2).absent(1);
        let recording = Recording::from_captures(script.captures());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.cbor");
        recording.save(&path).unwrap();

        let mut replay = ReplayProvider::open(&path).unwrap();
        assert_eq!(replay.frame_interval_ms(), DEFAULT_FRAME_INTERVAL_MS);

        let fist = HandPose::fist().frame();
        assert_eq!(replay.next_capture().unwrap().unwrap(), Capture::Hand(fist.clone()));
        assert_eq!(replay.next_capture().unwrap().unwrap(), Capture::Hand(fist));
        assert_eq!(replay.next_capture().unwrap().unwrap(), Capture::NoHand);
        assert!(replay.next_capture().is_none());
    }

    #[test]
    fn bad_frame_is_reported_and_skipped() {
        let recording = Recording {
            frame_interval_ms: 10,
            frames: vec![
                RecordedFrame { landmarks: Some(vec![Vec3::ZERO; 3]) },
                RecordedFrame { landmarks: None },
            ],
        };
        let mut replay = ReplayProvider::new(recording);

        match replay.next_capture() {
            Some(Err(ProviderError::Frame { index: 0, source })) => assert_eq!(
                source,
                CoreError::LandmarkCount { expected: LANDMARK_COUNT, actual: 3 }
            ),
            other => panic!("expected frame error, got {other:?}"),
        }
        assert_eq!(replay.next_capture().unwrap().unwrap(), Capture::NoHand);
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.cbor");
        std::fs::write(&path, b"not cbor at all").unwrap();

        assert!(matches!(ReplayProvider::open(&path), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            ReplayProvider::open(dir.path().join("missing.cbor")),
            Err(ProviderError::Io(_))
        ));
    }

    #[test]
    fn drag_ends_at_full_offset() {
        let mut script = ScriptedProvider::default().drag(&HandPose::fist(), 0.0, -0.1, 4);
        assert_eq!(script.remaining(), 4);

        let last = std::iter::from_fn(|| script.next_capture()).last().unwrap().unwrap();
        assert_eq!(last, Capture::Hand(HandPose::fist().shifted(0.0, -0.1).frame()));
    }
}
