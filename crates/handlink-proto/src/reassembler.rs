//! Newline framing over a byte stream.
//!
//! TCP delivers arbitrary chunks: one read may hold half a message, several
//! messages, or both. [`LineReassembler`] buffers bytes per connection and
//! yields complete lines in arrival order, keeping any trailing partial
//! message until its newline arrives.
//!
//! # Invariants
//!
//! - Yielded lines never contain `\n`
//! - Bytes are yielded in the order they were pushed, none are duplicated
//! - The buffer never holds a complete line after [`LineReassembler::drain`]
//! - An overlong message is reported once and skipped through its newline

use bytes::{Buf, BytesMut};

use crate::errors::{ProtocolError, Result};

/// Default upper bound on a single line, including unterminated data.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Per-connection line buffer.
#[derive(Debug)]
pub struct LineReassembler {
    buffer: BytesMut,
    max_line_len: usize,
    /// Inside an overlong message that was already reported
    discarding: bool,
}

impl Default for LineReassembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineReassembler {
    /// Create an empty reassembler that rejects lines longer than
    /// `max_line_len` bytes.
    pub fn new(max_line_len: usize) -> Self {
        debug_assert!(max_line_len > 0);
        Self { buffer: BytesMut::with_capacity(4096), max_line_len, discarding: false }
    }

    /// Append bytes from one read.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Number of buffered bytes not yet yielded.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete line, if any.
    ///
    /// Returns `None` when only a partial line (or nothing) is buffered.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidUtf8` if a complete line is not UTF-8; the line
    ///   is discarded
    /// - `ProtocolError::MessageTooLong` if a line, or unterminated data,
    ///   exceeds the limit; the rest of that message, up to and including
    ///   its newline, is discarded as it arrives
    pub fn next_line(&mut self) -> Option<Result<String>> {
        if self.discarding {
            let newline = self.buffer.iter().position(|&b| b == b'\n');
            match newline {
                Some(newline) => {
                    self.buffer.advance(newline + 1);
                    self.discarding = false;
                },
                None => {
                    self.buffer.clear();
                    return None;
                },
            }
        }

        let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') else {
            if self.buffer.len() > self.max_line_len {
                let len = self.buffer.len();
                self.buffer.clear();
                self.discarding = true;
                return Some(Err(ProtocolError::MessageTooLong { len, max: self.max_line_len }));
            }
            return None;
        };

        let frame = self.buffer.split_to(newline + 1);
        let line = &frame[..newline];

        if line.len() > self.max_line_len {
            return Some(Err(ProtocolError::MessageTooLong {
                len: line.len(),
                max: self.max_line_len,
            }));
        }

        Some(String::from_utf8(line.to_vec()).map_err(|_| ProtocolError::InvalidUtf8))
    }

    /// Take every complete line currently buffered.
    pub fn drain(&mut self) -> Vec<Result<String>> {
        std::iter::from_fn(|| self.next_line()).collect()
    }

    /// Append one read and return every line it completed.
    pub fn push(&mut self, data: &[u8]) -> Vec<Result<String>> {
        self.extend(data);
        self.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_message_is_joined() {
        let mut reassembler = LineReassembler::default();

        assert!(reassembler.push(b"PINCH:10,2").is_empty());
        assert_eq!(reassembler.buffered(), 10);

        let lines: Vec<_> = reassembler
            .push(b"0\nCAMERA:1,2,3\n")
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["PINCH:10,20".to_string(), "CAMERA:1,2,3".to_string()]);
        assert_eq!(reassembler.buffered(), 0);
    }

    #[test]
    fn trailing_partial_stays_buffered() {
        let mut reassembler = LineReassembler::default();

        let lines = reassembler.push(b"MOVE:UP\nMOVE:DO");
        assert_eq!(lines, vec![Ok("MOVE:UP".to_string())]);
        assert_eq!(reassembler.buffered(), 7);

        let lines = reassembler.push(b"WN\n");
        assert_eq!(lines, vec![Ok("MOVE:DOWN".to_string())]);
    }

    #[test]
    fn empty_lines_are_yielded() {
        let mut reassembler = LineReassembler::default();
        assert_eq!(reassembler.push(b"\n\n"), vec![Ok(String::new()), Ok(String::new())]);
    }

    #[test]
    fn invalid_utf8_drops_only_that_line() {
        let mut reassembler = LineReassembler::default();

        let lines = reassembler.push(b"\xff\xfe\nCONTROL_END\n");
        assert_eq!(lines, vec![Err(ProtocolError::InvalidUtf8), Ok("CONTROL_END".to_string())]);
    }

    #[test]
    fn unterminated_overflow_is_discarded() {
        let mut reassembler = LineReassembler::new(8);

        let lines = reassembler.push(b"0123456789");
        assert_eq!(lines, vec![Err(ProtocolError::MessageTooLong { len: 10, max: 8 })]);
        assert_eq!(reassembler.buffered(), 0);

        assert!(reassembler.push(b"more of the same").is_empty());
        assert_eq!(reassembler.push(b"tail\nMOVE:UP\n"), vec![Ok("MOVE:UP".to_string())]);
    }

    #[test]
    fn long_complete_line_is_rejected() {
        let mut reassembler = LineReassembler::new(4);

        let lines = reassembler.push(b"TOO LONG\nOK\n");
        assert_eq!(
            lines,
            vec![Err(ProtocolError::MessageTooLong { len: 8, max: 4 }), Ok("OK".to_string())]
        );
    }
}
