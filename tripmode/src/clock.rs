//! Host clocks
//!
//! `MonotonicClock` is for live streams. `CaptureClock` follows the
//! timestamps of a recorded log, so a replay makes the same decisions no
//! matter how fast it is read.

use std::cell::Cell;
use std::rc::Rc;

use tripmode_core::time::Instant;
use tripmode_core::traits::Clock;

/// Time since the clock was created, from the OS monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

impl MonotonicClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        let us = u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX);
        Instant::from_micros(us)
    }
}

/// Clock driven by capture timestamps
///
/// Clones share the same time. The clock never moves backwards: an
/// out-of-order timestamp leaves it where it is.
#[derive(Debug, Clone, Default)]
pub struct CaptureClock {
    now: Rc<Cell<Instant>>,
}

impl CaptureClock {
    /// Create a clock at the start of the timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward to `t`
    pub fn advance_to(&self, t: Instant) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }
}

impl Clock for CaptureClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
