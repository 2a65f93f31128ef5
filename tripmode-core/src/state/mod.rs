//! Drive mode state
//!
//! The vehicle's drive modes and the events the controller reports while
//! moving between them.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{DriveMode, MODE_COUNT};
