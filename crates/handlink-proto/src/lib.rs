//! Handlink wire protocol.
//!
//! Gesture events travel from the tracking client to the scene host as
//! newline-terminated UTF-8 text lines. This crate owns both ends of that
//! contract and performs no I/O:
//!
//! - [`GestureEvent`]: what the client emits
//! - [`Command`]: what the server decodes
//! - [`LineReassembler`]: newline framing over partial reads
//!
//! See [`codec`] for the line grammar.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod command;
pub mod errors;
pub mod event;
pub mod reassembler;

pub use command::Command;
pub use errors::{ProtocolError, Result};
pub use event::{FingerPosition, GestureEvent, MoveDirection, PeaceDirection, Position};
pub use reassembler::{DEFAULT_MAX_LINE_LEN, LineReassembler};
