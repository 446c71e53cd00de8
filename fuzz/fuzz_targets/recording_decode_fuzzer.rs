//! Fuzz target for landmark recording files
//!
//! Recordings are user-supplied files decoded with CBOR before replay.
//!
//! # Strategy
//!
//! - Random bytes: arbitrary CBOR-ish data
//! - Structured: well-formed recordings with fuzzed landmark counts and
//!   coordinates (including NaN), re-encoded and decoded
//!
//! # Invariants
//!
//! - Decoding NEVER panics; garbage is `ProviderError::Decode`
//! - Replay yields exactly one capture per recorded frame
//! - Frames without exactly 21 landmarks are reported, never replayed

#![no_main]

use arbitrary::Arbitrary;
use handlink_client::{LandmarkProvider, RecordedFrame, Recording, ReplayProvider};
use handlink_core::{LANDMARK_COUNT, Vec3};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Frames { interval_ms: u64, frames: Vec<Option<Vec<(f32, f32, f32)>>> },
}

fn replay(recording: Recording) {
    let expected = recording.frames.len();
    let counts: Vec<Option<usize>> =
        recording.frames.iter().map(|f| f.landmarks.as_ref().map(Vec::len)).collect();

    let mut provider = ReplayProvider::new(recording);
    let mut seen = 0;
    while let Some(capture) = provider.next_capture() {
        if let Some(Some(count)) = counts.get(seen)
            && *count != LANDMARK_COUNT
        {
            assert!(capture.is_err(), "replayed a frame with {count} landmarks");
        }
        seen += 1;
    }
    assert_eq!(seen, expected);
}

fuzz_target!(|input: Input| {
    match input {
        Input::Raw(bytes) => {
            if let Ok(recording) = Recording::from_reader(bytes.as_slice()) {
                replay(recording);
            }
        }
        Input::Frames { interval_ms, frames } => {
            let recording = Recording {
                frame_interval_ms: interval_ms,
                frames: frames
                    .into_iter()
                    .map(|landmarks| RecordedFrame {
                        landmarks: landmarks.map(|points| {
                            points
                                .into_iter()
                                .map(|(x, y, z)| {
                                    Vec3::new(f64::from(x), f64::from(y), f64::from(z))
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            };

            let mut encoded = Vec::new();
            recording.to_writer(&mut encoded).unwrap();
            replay(Recording::from_reader(encoded.as_slice()).unwrap());
        }
    }
});
