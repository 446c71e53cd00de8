//! Client error types.

use std::io;

use handlink_core::CoreError;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting failed with an error that retrying will not fix.
    #[error("connection failed: {0}")]
    Connection(#[source] io::Error),

    /// Every connection attempt was refused.
    #[error("server refused {attempts} connection attempts")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        source: io::Error,
    },

    /// The writer task has stopped; nothing more can be sent.
    #[error("connection closed")]
    Closed,

    /// Writing to the socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Landmark provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Reading or writing a recording failed.
    #[error("recording I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A recording is not valid CBOR for the recording schema.
    #[error("recording decode failed: {0}")]
    Decode(String),

    /// A recording could not be serialized.
    #[error("recording encode failed: {0}")]
    Encode(String),

    /// A recorded frame does not describe a hand.
    #[error("invalid frame {index}: {source}")]
    Frame {
        /// Position of the frame in the recording
        index: usize,
        /// What is wrong with it
        #[source]
        source: CoreError,
    },
}
