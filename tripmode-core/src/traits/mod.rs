//! Collaborator traits
//!
//! These traits define the interface between the controller and the
//! transport and timing implementations supplied by the host.

pub mod bus;
pub mod clock;

pub use bus::{FrameSink, FrameSource};
pub use clock::Clock;
