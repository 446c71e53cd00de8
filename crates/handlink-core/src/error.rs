//! Error types for the gesture core.

use thiserror::Error;

/// Errors raised while building core inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A landmark frame must hold exactly one point per anatomical landmark
    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount {
        /// Required landmark count
        expected: usize,
        /// Landmarks supplied
        actual: usize,
    },

    /// Landmark coordinates must be finite
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark {
        /// Offending landmark index
        index: usize,
    },
}
