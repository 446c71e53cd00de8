//! Server error types.

use std::{fmt, io};

use crate::scene::SceneError;

/// Errors that can occur in the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, zero-sized buffers).
    ///
    /// Fatal at startup. Fix configuration and restart.
    Config(String),

    /// A listener could not bind its address.
    ///
    /// Fatal to that listener. The command listener failing to bind stops
    /// startup; the finger-only listener failing is logged and skipped.
    Bind {
        /// Address that was requested
        address: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Accepting a connection failed.
    ///
    /// Logged by the accept loop, which keeps listening.
    Accept(io::Error),

    /// Reading from an established connection failed.
    ///
    /// Ends that connection only. Other clients are unaffected.
    Transport(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Bind { address, source } => write!(f, "failed to bind {address}: {source}"),
            Self::Accept(err) => write!(f, "accept error: {err}"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Bind { source, .. } => Some(source),
            Self::Accept(err) | Self::Transport(err) => Some(err),
        }
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        Self::Transport(err)
    }
}

/// A scene call requested by a command failed.
///
/// Logged and dropped; never ends the connection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{command} failed: {source}")]
pub struct DispatchError {
    /// Wire name of the command that requested the call
    pub command: &'static str,
    /// Scene failure
    #[source]
    pub source: SceneError,
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn bind_error_names_address() {
        let err = ServerError::Bind {
            address: "127.0.0.1:12340".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };

        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:12340: address in use");
        assert!(err.source().is_some());
    }

    #[test]
    fn dispatch_error_display() {
        let err = DispatchError { command: "PEACE", source: SceneError::NotAFace };

        assert_eq!(err.to_string(), "PEACE failed: selection is not a face");
        assert!(err.source().is_some());
    }
}
