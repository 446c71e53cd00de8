//! Text line codec.
//!
//! # Wire Format
//!
//! One message per `\n`-terminated UTF-8 line. A line starts with a command
//! prefix followed by positional, comma-separated fields. The fixed arity per
//! prefix is:
//!
//! ```text
//! GESTURE:CAMERA,yaw,pitch,roll[,x,y]   3 or 5 numbers
//! GESTURE:POINT,x,y                      2 numbers
//! GESTURE:ROTATE,yaw,pitch,roll          3 numbers
//! CONTROL_END                            no payload
//! CREATE:<text>                          verbatim text
//! POINT_DIR:x,y,z | POINT:x,y,z          3 numbers
//! VECTOR:dx,dy                           2 numbers
//! MOVE:LEFT|RIGHT|UP|DOWN|CENTER
//! PEACE:LEFT|RIGHT
//! CAMERA:yaw,pitch,roll                  3 numbers
//! PINCH:x,y                              2 integers
//! id,x,y;id,x,y;...                      finger tracking (no prefix)
//! ```
//!
//! Floats are written with Rust's shortest round-trip formatting, so decoding
//! an encoded line reproduces the exact values. Fields are trimmed before
//! parsing and non-finite values are rejected.

use bytes::{BufMut, BytesMut};

use crate::{
    command::Command,
    errors::{ProtocolError, Result},
    event::{FingerPosition, GestureEvent, MoveDirection, PeaceDirection, Position},
};

const GESTURE: &str = "GESTURE:";
const CONTROL_END: &str = "CONTROL_END";
const CREATE: &str = "CREATE:";
const POINT_DIR: &str = "POINT_DIR:";
const POINT: &str = "POINT:";
const VECTOR: &str = "VECTOR:";
const MOVE: &str = "MOVE:";
const PEACE: &str = "PEACE:";
const CAMERA: &str = "CAMERA:";
const PINCH: &str = "PINCH:";

/// Collapse a free-text payload onto a single trimmed line.
pub(crate) fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

impl GestureEvent {
    /// Encode as a wire line without the trailing newline.
    pub fn encode(&self) -> String {
        match self {
            Self::ControlStart { pos } => format!("{GESTURE}CAMERA,0,0,0,{},{}", pos.x, pos.y),
            Self::ControlEnd => CONTROL_END.to_string(),
            Self::CameraRotate { yaw, pitch, roll } => {
                format!("{GESTURE}CAMERA,{yaw},{pitch},{roll}")
            },
            Self::ObjectRotate { yaw, pitch, roll } => {
                format!("{GESTURE}ROTATE,{yaw},{pitch},{roll}")
            },
            Self::PointStart { pos } => format!("{GESTURE}POINT,{},{}", pos.x, pos.y),
            Self::Vector { dx, dy } => format!("{VECTOR}{dx},{dy}"),
            Self::Pinch { x, y } => format!("{PINCH}{x},{y}"),
            Self::PointDir { x, y, z } => format!("{POINT_DIR}{x},{y},{z}"),
            Self::Move { dir } => format!("{MOVE}{dir}"),
            Self::Peace { dir } => format!("{PEACE}{dir}"),
            Self::Camera { yaw, pitch, roll } => format!("{CAMERA}{yaw},{pitch},{roll}"),
            Self::FingerTrack(fingers) => fingers
                .iter()
                .map(|f| format!("{},{},{}", f.id, f.x, f.y))
                .collect::<Vec<_>>()
                .join(";"),
            Self::Create { raw_command } => format!("{CREATE}{}", single_line(raw_command)),
        }
    }

    /// Append the newline-terminated wire line to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        let line = self.encode();
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
    }
}

impl Command {
    /// Decode one line (without its newline).
    ///
    /// Surrounding whitespace, including a trailing `\r`, is ignored. A line
    /// with no known prefix is parsed as finger tracking; an empty line is an
    /// empty finger update.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FieldCount` if the arity does not match the prefix
    /// - `ProtocolError::InvalidNumber` / `NonFinite` for unparsable fields
    /// - `ProtocolError::InvalidDirection` for unknown MOVE/PEACE keywords
    /// - `ProtocolError::UnknownGesture` for unknown `GESTURE:` subtypes
    /// - `ProtocolError::UnexpectedPayload` for text after `CONTROL_END`
    pub fn decode(line: &str) -> Result<Self> {
        let line = line.trim();

        if let Some(payload) = line.strip_prefix(GESTURE) {
            return decode_gesture(payload);
        }

        if let Some(rest) = line.strip_prefix(CONTROL_END) {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Err(ProtocolError::UnexpectedPayload {
                    command: "CONTROL_END",
                    payload: rest.to_string(),
                });
            }
            return Ok(Self::ControlEnd);
        }

        if let Some(payload) = line.strip_prefix(CREATE) {
            return Ok(Self::Create { raw_command: payload.trim().to_string() });
        }

        if let Some(payload) = line.strip_prefix(POINT_DIR).or_else(|| line.strip_prefix(POINT)) {
            let [x, y, z] = floats::<3>("POINT_DIR", payload, "3")?;
            return Ok(Self::PointDir { x, y, z });
        }

        if let Some(payload) = line.strip_prefix(VECTOR) {
            let [dx, dy] = floats::<2>("VECTOR", payload, "2")?;
            return Ok(Self::Vector { dx, dy });
        }

        if let Some(payload) = line.strip_prefix(MOVE) {
            let keyword = payload.trim();
            let dir = MoveDirection::from_keyword(keyword).ok_or_else(|| {
                ProtocolError::InvalidDirection { command: "MOVE", value: keyword.to_string() }
            })?;
            return Ok(Self::Move { dir });
        }

        if let Some(payload) = line.strip_prefix(PEACE) {
            let keyword = payload.trim();
            let dir = PeaceDirection::from_keyword(keyword).ok_or_else(|| {
                ProtocolError::InvalidDirection { command: "PEACE", value: keyword.to_string() }
            })?;
            return Ok(Self::Peace { dir });
        }

        if let Some(payload) = line.strip_prefix(CAMERA) {
            let [yaw, pitch, roll] = floats::<3>("CAMERA", payload, "3")?;
            return Ok(Self::Camera { yaw, pitch, roll });
        }

        if let Some(payload) = line.strip_prefix(PINCH) {
            let fields = split_fields(payload);
            let [x, y] = fields.as_slice() else {
                return Err(ProtocolError::FieldCount {
                    command: "PINCH",
                    expected: "2",
                    actual: fields.len(),
                });
            };
            return Ok(Self::Pinch { x: parse_i32("PINCH", x)?, y: parse_i32("PINCH", y)? });
        }

        decode_fingers(line).map(Self::FingerTrack)
    }
}

fn decode_gesture(payload: &str) -> Result<Command> {
    let (subtype, rest) = match payload.split_once(',') {
        Some((subtype, rest)) => (subtype.trim(), rest),
        None => (payload.trim(), ""),
    };

    match subtype {
        "CAMERA" => {
            let fields = split_fields(rest);
            match fields.as_slice() {
                [yaw, pitch, roll] => Ok(Command::GestureCamera {
                    yaw: parse_f64("GESTURE:CAMERA", yaw)?,
                    pitch: parse_f64("GESTURE:CAMERA", pitch)?,
                    roll: parse_f64("GESTURE:CAMERA", roll)?,
                    anchor: None,
                }),
                [yaw, pitch, roll, x, y] => Ok(Command::GestureCamera {
                    yaw: parse_f64("GESTURE:CAMERA", yaw)?,
                    pitch: parse_f64("GESTURE:CAMERA", pitch)?,
                    roll: parse_f64("GESTURE:CAMERA", roll)?,
                    anchor: Some(Position::new(
                        parse_f64("GESTURE:CAMERA", x)?,
                        parse_f64("GESTURE:CAMERA", y)?,
                    )),
                }),
                other => Err(ProtocolError::FieldCount {
                    command: "GESTURE:CAMERA",
                    expected: "3 or 5",
                    actual: other.len(),
                }),
            }
        },
        "POINT" => {
            let [x, y] = floats::<2>("GESTURE:POINT", rest, "2")?;
            Ok(Command::GesturePoint { pos: Position::new(x, y) })
        },
        "ROTATE" => {
            let [yaw, pitch, roll] = floats::<3>("GESTURE:ROTATE", rest, "3")?;
            Ok(Command::GestureRotate { yaw, pitch, roll })
        },
        other => Err(ProtocolError::UnknownGesture(other.to_string())),
    }
}

fn decode_fingers(line: &str) -> Result<Vec<FingerPosition>> {
    line.split(';')
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| {
            let fields = split_fields(segment);
            let [id, x, y] = fields.as_slice() else {
                return Err(ProtocolError::FieldCount {
                    command: "FINGERS",
                    expected: "3",
                    actual: fields.len(),
                });
            };
            Ok(FingerPosition {
                id: parse_finger_id(id)?,
                x: parse_f64("FINGERS", x)?,
                y: parse_f64("FINGERS", y)?,
            })
        })
        .collect()
}

/// Split a payload on commas. An all-whitespace payload has zero fields.
fn split_fields(payload: &str) -> Vec<&str> {
    if payload.trim().is_empty() {
        return Vec::new();
    }
    payload.split(',').map(str::trim).collect()
}

fn floats<const N: usize>(
    command: &'static str,
    payload: &str,
    expected: &'static str,
) -> Result<[f64; N]> {
    let fields = split_fields(payload);
    if fields.len() != N {
        return Err(ProtocolError::FieldCount { command, expected, actual: fields.len() });
    }

    let mut values = [0.0; N];
    for (slot, field) in values.iter_mut().zip(fields) {
        *slot = parse_f64(command, field)?;
    }
    Ok(values)
}

fn parse_f64(command: &'static str, field: &str) -> Result<f64> {
    let value: f64 = field
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber { command, value: field.to_string() })?;

    if !value.is_finite() {
        return Err(ProtocolError::NonFinite { command, value: field.to_string() });
    }
    Ok(value)
}

fn parse_i32(command: &'static str, field: &str) -> Result<i32> {
    field.parse().map_err(|_| ProtocolError::InvalidNumber { command, value: field.to_string() })
}

/// Finger ids arrive as integers but some trackers send `1.0`.
fn parse_finger_id(field: &str) -> Result<u32> {
    let value = parse_f64("FINGERS", field)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ProtocolError::InvalidFingerId(field.to_string()));
    }
    Ok(value as u32)
}
