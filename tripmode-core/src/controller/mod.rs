//! Drive mode controller
//!
//! `CarState` holds the decision logic; `DriveLoop` wires it to a frame
//! source, a frame sink and a clock.

pub mod car_state;
pub mod drive_loop;

pub use car_state::{CarState, Update, MAX_PENDING_CLUSTERS};
pub use drive_loop::{DriveLoop, LoopError, Tick};
