//! Fuzz target for line reassembly across arbitrary read boundaries
//!
//! TCP delivers bytes in whatever pieces it likes. The reassembler must turn
//! any chunking of the same byte stream into the same lines.
//!
//! # Strategy
//!
//! - Stream: arbitrary bytes, including invalid UTF-8, bare `\r`, empty
//!   lines and runs without any newline
//! - Chunking: arbitrary cut points, including empty chunks
//! - Limit: small maximum line lengths so overflow paths are hit often
//!
//! # Invariants
//!
//! - Reassembly NEVER panics
//! - Chunking never changes which lines are yielded
//! - Yielded lines never contain `\n` and never exceed the limit
//! - Buffered bytes never exceed the limit plus one read

#![no_main]

use arbitrary::Arbitrary;
use handlink_proto::LineReassembler;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    stream: Vec<u8>,
    cuts: Vec<u16>,
    max_line_len: u8,
}

fn lines(reassembler: &mut LineReassembler, chunks: &[&[u8]], limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    for chunk in chunks {
        for line in reassembler.push(chunk).into_iter().flatten() {
            assert!(!line.contains('\n'));
            assert!(line.len() <= limit, "line of {} bytes exceeds {limit}", line.len());
            out.push(line);
        }
        assert!(reassembler.buffered() <= limit + chunk.len());
    }
    out
}

fuzz_target!(|input: Input| {
    let limit = usize::from(input.max_line_len).max(1);

    let mut cuts: Vec<usize> = input
        .cuts
        .iter()
        .map(|&cut| usize::from(cut) % (input.stream.len() + 1))
        .collect();
    cuts.sort_unstable();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(&input.stream[start..cut]);
        start = cut;
    }
    chunks.push(&input.stream[start..]);

    let whole = lines(&mut LineReassembler::new(limit), &[&input.stream], limit);
    let pieces = lines(&mut LineReassembler::new(limit), &chunks, limit);

    assert_eq!(whole, pieces);
});
