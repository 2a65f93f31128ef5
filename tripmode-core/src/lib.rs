//! Board-agnostic core logic for Tripmode
//!
//! This crate contains the drive mode controller and everything it needs
//! that does not depend on a specific CAN transport:
//!
//! - Drive modes and the events the controller reports
//! - Mode sequencer (button presses per mode, press clusters)
//! - Controller state machine and the receive/send loop
//! - Bus and clock collaborator traits
//! - Button press monitoring
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod monitor;
pub mod sequencer;
pub mod state;
pub mod time;
pub mod traits;

pub use config::ControllerConfig;
pub use controller::{CarState, DriveLoop, LoopError, Tick, Update};
pub use state::{DriveMode, Event};
pub use time::Instant;
