//! candump log line codec
//!
//! Line format (as written by `candump -L` from Linux can-utils):
//! ```text
//! (1436509053.850870) can0 3E9#1388000000000000
//!  └─ secs.micros ─┘  └bus┘ └ID┘ └── DATA ───┘
//! ```
//!
//! The bus index is the trailing number of the interface name, so `can1`
//! and `vcan1` both map to bus 1. Identifiers are three hex digits for
//! standard frames and eight for extended ones, and the width is kept when
//! the line is written back. Remote and CAN FD frames are rejected.

use core::fmt;

use heapless::Vec;

use crate::frame::{CanFrame, FrameError, MAX_DATA_LEN, MAX_STANDARD_ID};

/// Identifier width of a standard frame
const STANDARD_ID_DIGITS: usize = 3;

/// Identifier width of an extended frame
const EXTENDED_ID_DIGITS: usize = 8;

/// Errors that can occur while parsing a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CandumpError {
    /// Line does not have timestamp, interface and frame fields
    MissingField,
    /// Timestamp is not `(secs.micros)`
    InvalidTimestamp,
    /// Interface name has no bus number
    InvalidInterface,
    /// Identifier is not valid hex or out of range
    InvalidId,
    /// Payload is not hex byte pairs, or longer than 8 bytes
    InvalidData,
}

impl fmt::Display for CandumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CandumpError::MissingField => "expected `(timestamp) interface ID#DATA`",
            CandumpError::InvalidTimestamp => "invalid timestamp",
            CandumpError::InvalidInterface => "interface name has no bus number",
            CandumpError::InvalidId => "invalid frame identifier",
            CandumpError::InvalidData => "invalid frame data",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CandumpError {}

impl From<FrameError> for CandumpError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::PayloadTooLarge => CandumpError::InvalidData,
            FrameError::InvalidId => CandumpError::InvalidId,
        }
    }
}

/// One timestamped frame from a log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogLine {
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
    /// The frame
    pub frame: CanFrame,
}

impl LogLine {
    /// Pair a frame with a timestamp
    pub fn new(timestamp_us: u64, frame: CanFrame) -> Self {
        Self {
            timestamp_us,
            frame,
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.timestamp_us / 1_000_000;
        let micros = self.timestamp_us % 1_000_000;
        write!(f, "({}.{:06}) can{} ", secs, micros, self.frame.bus())?;

        if self.frame.is_extended() {
            write!(f, "{:08X}#", self.frame.id())?;
        } else {
            write!(f, "{:03X}#", self.frame.id())?;
        }

        for byte in self.frame.data() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Parse a single candump log line
pub fn parse_line(line: &str) -> Result<LogLine, CandumpError> {
    let mut fields = line.split_whitespace();
    let timestamp = fields.next().ok_or(CandumpError::MissingField)?;
    let interface = fields.next().ok_or(CandumpError::MissingField)?;
    let body = fields.next().ok_or(CandumpError::MissingField)?;

    let timestamp_us = parse_timestamp(timestamp)?;
    let bus = parse_bus(interface)?;

    let (id_text, data) = body.split_once('#').ok_or(CandumpError::MissingField)?;
    if !is_hex(id_text) {
        return Err(CandumpError::InvalidId);
    }
    let id = u32::from_str_radix(id_text, 16).map_err(|_| CandumpError::InvalidId)?;
    let data = parse_data(data)?;

    // Three digits for standard frames, eight for extended ones
    let frame = match id_text.len() {
        STANDARD_ID_DIGITS if id <= MAX_STANDARD_ID => CanFrame::new(id, &data, bus)?,
        EXTENDED_ID_DIGITS => CanFrame::new_extended(id, &data, bus)?,
        _ => return Err(CandumpError::InvalidId),
    };
    Ok(LogLine::new(timestamp_us, frame))
}

/// Parse `(secs.frac)` into microseconds
fn parse_timestamp(field: &str) -> Result<u64, CandumpError> {
    let inner = field
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or(CandumpError::InvalidTimestamp)?;

    let (secs, frac) = inner.split_once('.').unwrap_or((inner, ""));
    if !is_decimal(secs) || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CandumpError::InvalidTimestamp);
    }

    let secs: u64 = secs.parse().map_err(|_| CandumpError::InvalidTimestamp)?;

    // Right-pad the fraction to microseconds: ".85" is 850000 us
    let mut micros: u64 = 0;
    for i in 0..6 {
        let digit = frac.as_bytes().get(i).map_or(0, |b| b - b'0');
        micros = micros * 10 + digit as u64;
    }

    secs.checked_mul(1_000_000)
        .and_then(|us| us.checked_add(micros))
        .ok_or(CandumpError::InvalidTimestamp)
}

/// Extract the bus number from an interface name like `can0`
fn parse_bus(interface: &str) -> Result<u8, CandumpError> {
    let digits = interface.trim_start_matches(|c: char| !c.is_ascii_digit());
    if digits.is_empty() {
        return Err(CandumpError::InvalidInterface);
    }
    digits.parse().map_err(|_| CandumpError::InvalidInterface)
}

/// Decode hex byte pairs
fn parse_data(hex: &str) -> Result<Vec<u8, MAX_DATA_LEN>, CandumpError> {
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CandumpError::InvalidData);
    }

    let mut data = Vec::new();
    for i in (0..hex.len()).step_by(2) {
        let byte =
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| CandumpError::InvalidData)?;
        data.push(byte).map_err(|_| CandumpError::InvalidData)?;
    }
    Ok(data)
}

/// Non-empty and only hex digits (`from_str_radix` alone accepts a sign)
fn is_hex(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_decimal(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}
