//! Bus monitoring
//!
//! Passive observers for the monitor-only mode, where nothing is sent.

pub mod button;

pub use button::ButtonMonitor;
