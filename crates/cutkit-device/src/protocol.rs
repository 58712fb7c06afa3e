//! Wire protocol: ASCII commands terminated by `0x03`.
//!
//! Movement commands are `M<y>,<x>` (move, pen up) and `D<y>,<x>` (draw,
//! pen down) with integer device-unit coordinates — note the axis order
//! is swapped relative to the logical x,y. Configuration commands are
//! distinct letter-prefixed strings with the same terminator. The status
//! query is a fixed 2-byte command; the response is a fixed-size frame
//! ending in the terminator byte.

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};

/// Every command ends with this byte.
pub const CMD_TERMINATOR: u8 = 0x03;

/// Fixed 2-byte status query (ESC ENQ).
pub const STATUS_REQUEST: &[u8] = &[0x1b, 0x05];

/// Device initialization command (ESC EOT).
pub const CMD_INITIALIZE: &[u8] = &[0x1b, 0x04];

/// Status responses are exactly this long, terminator included.
pub const STATUS_FRAME_LEN: usize = 2;

/// Device status derived from a status frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Idle, ready for commands.
    Ready,
    /// Executing a move; its command buffer must not be pushed further.
    Moving,
    /// No media loaded.
    Unloaded,
    /// Terminated frame with an unrecognized leading byte. Non-fatal;
    /// logged and retried by the polling loops.
    Unknown(Vec<u8>),
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Moving => write!(f, "moving"),
            Self::Unloaded => write!(f, "unloaded"),
            Self::Unknown(bytes) => write!(f, "unknown ({bytes:?})"),
        }
    }
}

/// Parse a status frame.
///
/// The frame must be [`STATUS_FRAME_LEN`] bytes ending in
/// [`CMD_TERMINATOR`]; anything else is [`DeviceError::MalformedStatus`].
/// A well-terminated frame with an unexpected payload maps to
/// [`SessionState::Unknown`] instead of an error.
pub fn parse_status(frame: &[u8]) -> Result<SessionState> {
    if frame.len() != STATUS_FRAME_LEN || frame[STATUS_FRAME_LEN - 1] != CMD_TERMINATOR {
        return Err(DeviceError::MalformedStatus { bytes: frame.to_vec() });
    }
    Ok(match frame[0] {
        b'0' => SessionState::Ready,
        b'1' => SessionState::Moving,
        b'2' => SessionState::Unloaded,
        _ => SessionState::Unknown(frame.to_vec()),
    })
}

/// One movement command in device units, already transformed, offset and
/// clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceCommand {
    /// Travel with the pen/blade up.
    Move {
        /// Target x in device units.
        x: i32,
        /// Target y in device units.
        y: i32,
    },
    /// Cut/draw with the pen/blade down.
    Draw {
        /// Target x in device units.
        x: i32,
        /// Target y in device units.
        y: i32,
    },
}

impl DeviceCommand {
    /// Append the wire encoding to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match *self {
            // The device wants the feed axis first.
            DeviceCommand::Move { x, y } => out.extend_from_slice(format!("M{y},{x}").as_bytes()),
            DeviceCommand::Draw { x, y } => out.extend_from_slice(format!("D{y},{x}").as_bytes()),
        }
        out.push(CMD_TERMINATOR);
    }
}

/// Configuration command builders.
pub mod cmd {
    use super::CMD_TERMINATOR;

    fn terminated(body: String) -> Vec<u8> {
        let mut v = body.into_bytes();
        v.push(CMD_TERMINATOR);
        v
    }

    /// Select a media kind by vendor id.
    pub fn media(id: u16) -> Vec<u8> {
        terminated(format!("FW{id}"))
    }

    /// Set the tool speed (1..=10).
    pub fn speed(v: u8) -> Vec<u8> {
        terminated(format!("!{v}"))
    }

    /// Set the tool pressure (1..=33).
    pub fn pressure(v: u8) -> Vec<u8> {
        terminated(format!("FX{v}"))
    }

    /// Set the blade-rotation compensation circle, device units.
    pub fn blade_circle(v: u8) -> Vec<u8> {
        terminated(format!("FC{v}"))
    }

    /// Enable/disable track enhancing (extra media feed rollers pass).
    pub fn track_enhance(on: bool) -> Vec<u8> {
        terminated(format!("FY{}", if on { 1 } else { 0 }))
    }

    /// Select landscape orientation.
    pub fn landscape(on: bool) -> Vec<u8> {
        terminated(format!("FN{}", if on { 1 } else { 0 }))
    }

    /// Return the head to the loading position.
    pub fn home() -> Vec<u8> {
        terminated("H".to_string())
    }

    /// Ask the optical sensor to search for registration marks spaced
    /// `length_units` along the feed axis and `width_units` across it.
    pub fn regmark_search(length_units: i32, width_units: i32) -> Vec<u8> {
        let mut seq = terminated("TB99".to_string());
        seq.extend(terminated("TB55,1".to_string()));
        seq.extend(terminated(format!("TB123,{length_units},{width_units}")));
        seq
    }
}
