//! CAN bus protocol for Tripmode
//!
//! This crate defines the two messages the drive mode controller cares about
//! on the vehicle's powertrain bus, and a text codec for candump log lines.
//!
//! # Messages
//!
//! ```text
//! ┌───────┬──────────────────────┬─────────────────────────────────────┐
//! │ ID    │ Name                 │ Layout                              │
//! ├───────┼──────────────────────┼─────────────────────────────────────┤
//! │ 0x3E9 │ Vehicle speed        │ bytes 0-1 big-endian u16, × 0.01    │
//! │ 0x1E1 │ Steering wheel btns  │ byte 4 bit 7 = drive mode button    │
//! └───────┴──────────────────────┴─────────────────────────────────────┘
//! ```
//!
//! A simulated drive mode button press is the 0x1E1 frame with only the
//! drive mode bit set: `00 00 00 00 80 00 00`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod candump;
pub mod frame;
pub mod signals;

pub use candump::{parse_line, CandumpError, LogLine};
pub use frame::{CanFrame, FrameError, MAX_DATA_LEN};
pub use signals::{
    decode, decode_button, decode_speed, press_frame, Signal, BUTTON_MSG_ID, PRESS_PAYLOAD,
    SPEED_MSG_ID,
};
