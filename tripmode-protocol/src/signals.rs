//! Signal decoding for the speed and steering wheel button messages
//!
//! All decoders are pure: identical payloads always give identical results.
//! A payload too short for the addressed signal decodes to `None`.

use heapless::Vec;

use crate::frame::{CanFrame, MAX_DATA_LEN};

/// Vehicle speed message (1001 decimal)
pub const SPEED_MSG_ID: u32 = 0x3E9;

/// Steering wheel button message (481 decimal)
pub const BUTTON_MSG_ID: u32 = 0x1E1;

/// Payload of a drive mode button press (0x80 sets bit 7 of byte 4)
pub const PRESS_PAYLOAD: [u8; 7] = [0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00];

/// Speed scaling factor (raw value × 0.01)
const SPEED_DIVISOR: f32 = 100.0;

/// Byte holding the drive mode button bit
const BUTTON_BYTE: usize = 4;

/// Drive mode button bit mask
const BUTTON_MASK: u8 = 0x80;

/// A decoded signal value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Vehicle speed in whole and fractional units
    Speed(f32),
    /// Drive mode button state (true = pressed)
    Button(bool),
}

/// Decode vehicle speed from a 0x3E9 payload
///
/// Bytes 0-1 are a big-endian u16 with a 0.01 factor, so `[0x13, 0x88]`
/// (5000) decodes to 50.0.
pub fn decode_speed(payload: &[u8]) -> Option<f32> {
    match payload {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo]) as f32 / SPEED_DIVISOR),
        _ => None,
    }
}

/// Decode the drive mode button state from a 0x1E1 payload
pub fn decode_button(payload: &[u8]) -> Option<bool> {
    payload
        .get(BUTTON_BYTE)
        .map(|byte| byte & BUTTON_MASK != 0)
}

/// Decode a frame by identifier
///
/// Returns `None` for identifiers the controller does not use and for
/// payloads too short for their signal.
pub fn decode(frame: &CanFrame) -> Option<Signal> {
    match frame.id() {
        SPEED_MSG_ID => decode_speed(frame.data()).map(Signal::Speed),
        BUTTON_MSG_ID => decode_button(frame.data()).map(Signal::Button),
        _ => None,
    }
}

/// Build the simulated drive mode button press frame for `bus`
pub fn press_frame(bus: u8) -> CanFrame {
    let mut data: Vec<u8, MAX_DATA_LEN> = Vec::new();
    for &byte in PRESS_PAYLOAD.iter() {
        // Cannot fail: 7 bytes always fit in 8
        let _ = data.push(byte);
    }
    CanFrame::from_parts(BUTTON_MSG_ID, data, bus)
}
