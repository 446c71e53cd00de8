//! Protocol error types.
//!
//! Every failure here is scoped to a single message: the offending line is
//! dropped and the connection keeps going.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding or reassembling wire messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// `GESTURE:` line with a subtype we do not understand
    #[error("unknown gesture subtype: {0:?}")]
    UnknownGesture(String),

    /// Wrong number of positional fields for the command
    #[error("{command}: expected {expected} fields, got {actual}")]
    FieldCount {
        /// Command prefix being decoded
        command: &'static str,
        /// Accepted arity, e.g. "3" or "3 or 5"
        expected: &'static str,
        /// Number of fields present
        actual: usize,
    },

    /// A field failed to parse as a number
    #[error("{command}: invalid number {value:?}")]
    InvalidNumber {
        /// Command prefix being decoded
        command: &'static str,
        /// Raw field text
        value: String,
    },

    /// A field parsed to NaN or infinity
    #[error("{command}: non-finite value {value:?}")]
    NonFinite {
        /// Command prefix being decoded
        command: &'static str,
        /// Raw field text
        value: String,
    },

    /// Finger id that is negative or not a whole number
    #[error("invalid finger id {0:?}")]
    InvalidFingerId(String),

    /// Direction keyword outside the accepted set
    #[error("{command}: invalid direction {value:?}")]
    InvalidDirection {
        /// Command prefix being decoded
        command: &'static str,
        /// Raw field text
        value: String,
    },

    /// Payload attached to a command that takes none
    #[error("{command}: unexpected payload {payload:?}")]
    UnexpectedPayload {
        /// Command keyword
        command: &'static str,
        /// Trailing text
        payload: String,
    },

    /// Line is not valid UTF-8
    #[error("message is not valid UTF-8")]
    InvalidUtf8,

    /// Unterminated data exceeded the configured line limit
    #[error("message too long: {len} bytes exceeds limit of {max}")]
    MessageTooLong {
        /// Bytes discarded
        len: usize,
        /// Configured limit
        max: usize,
    },
}

impl ProtocolError {
    /// Returns true if the error came from framing rather than message
    /// content.
    ///
    /// Framing errors mean bytes were discarded without ever being decoded.
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::InvalidUtf8 | Self::MessageTooLong { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_errors_are_classified() {
        assert!(ProtocolError::InvalidUtf8.is_framing());
        assert!(ProtocolError::MessageTooLong { len: 10, max: 4 }.is_framing());
        assert!(!ProtocolError::UnknownGesture("WAVE".to_string()).is_framing());
        assert!(
            !ProtocolError::FieldCount { command: "POINT_DIR", expected: "3", actual: 2 }
                .is_framing()
        );
    }

    #[test]
    fn field_count_message_names_command() {
        let err = ProtocolError::FieldCount { command: "POINT_DIR", expected: "3", actual: 2 };
        assert_eq!(err.to_string(), "POINT_DIR: expected 3 fields, got 2");
    }
}
