//! Fuzz target for wire line decoding
//!
//! Every line a client sends goes through `Command::decode` on the server
//! task, so a panic here takes a connection down.
//!
//! # Strategy
//!
//! - Known prefixes with fuzzed fields: right and wrong arity, numbers,
//!   words, empty fields, NaN and infinities, stray whitespace
//! - Finger tracking lists with fuzzed triples and separators
//! - Raw bytes: arbitrary UTF-8 text with no structure
//!
//! # Invariants
//!
//! - Decoding NEVER panics
//! - A decoded command never carries a NaN or infinite number
//! - `CREATE` text never contains a line break
//! - Every finger in a decoded finger list has a name

#![no_main]

use arbitrary::Arbitrary;
use handlink_proto::Command;
use libfuzzer_sys::fuzz_target;

const PREFIXES: [&str; 12] = [
    "GESTURE:CAMERA,",
    "GESTURE:POINT,",
    "GESTURE:ROTATE,",
    "GESTURE:SPIN,",
    "CONTROL_END",
    "CREATE:",
    "POINT_DIR:",
    "POINT:",
    "VECTOR:",
    "MOVE:",
    "PEACE:",
    "PINCH:",
];

#[derive(Debug, Clone, Arbitrary)]
enum Field {
    Float(f64),
    Int(i64),
    Word(String),
    Empty,
    Nan,
    Infinity,
    Padded(f32),
}

impl Field {
    fn render(&self) -> String {
        match self {
            Self::Float(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Word(word) => word.clone(),
            Self::Empty => String::new(),
            Self::Nan => "NaN".to_string(),
            Self::Infinity => "-inf".to_string(),
            Self::Padded(value) => format!("  {value} "),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Line {
    Prefixed { prefix: u8, fields: Vec<Field> },
    Fingers { triples: Vec<(Field, Field, Field)>, trailing_separator: bool },
    Raw(String),
}

impl Line {
    fn render(&self) -> String {
        match self {
            Self::Prefixed { prefix, fields } => {
                let prefix = PREFIXES[usize::from(*prefix) % PREFIXES.len()];
                let fields: Vec<String> = fields.iter().map(Field::render).collect();
                format!("{prefix}{}", fields.join(","))
            }
            Self::Fingers { triples, trailing_separator } => {
                let mut line = triples
                    .iter()
                    .map(|(id, x, y)| format!("{},{},{}", id.render(), x.render(), y.render()))
                    .collect::<Vec<_>>()
                    .join(";");
                if *trailing_separator {
                    line.push(';');
                }
                line
            }
            Self::Raw(text) => text.clone(),
        }
    }
}

fuzz_target!(|line: Line| {
    let text = line.render();
    let Ok(command) = Command::decode(&text) else {
        return;
    };

    let numbers: Vec<f64> = match &command {
        Command::GestureCamera { yaw, pitch, roll, anchor } => {
            let mut numbers = vec![*yaw, *pitch, *roll];
            if let Some(anchor) = anchor {
                numbers.extend([anchor.x, anchor.y]);
            }
            numbers
        }
        Command::GesturePoint { pos } => vec![pos.x, pos.y],
        Command::GestureRotate { yaw, pitch, roll } | Command::Camera { yaw, pitch, roll } => {
            vec![*yaw, *pitch, *roll]
        }
        Command::PointDir { x, y, z } => vec![*x, *y, *z],
        Command::Vector { dx, dy } => vec![*dx, *dy],
        Command::FingerTrack(fingers) => {
            for finger in fingers {
                assert!(!finger.name().is_empty());
            }
            fingers.iter().flat_map(|f| [f.x, f.y]).collect()
        }
        Command::Create { raw_command } => {
            assert!(!raw_command.contains(['\n', '\r']), "multi-line CREATE: {raw_command:?}");
            Vec::new()
        }
        Command::ControlEnd
        | Command::Move { .. }
        | Command::Peace { .. }
        | Command::Pinch { .. } => Vec::new(),
    };

    for number in numbers {
        assert!(number.is_finite(), "non-finite value decoded from {text:?}");
    }
});
