//! Events reported by the controller
//!
//! The controller does not log. Each update returns what it decided so the
//! host can log or count it.

use super::machine::DriveMode;

/// Outcome of a speed sample or a mode switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Zero reading while above the threshold, dropped as a sensor dropout
    SampleDiscarded {
        /// Speed kept from the previous sample
        speed: i32,
    },
    /// Mode switch accepted; `presses` clusters were queued
    SwitchScheduled {
        /// New mode
        mode: DriveMode,
        /// Number of button presses queued
        presses: usize,
        /// Speed at the time of the switch
        speed: i32,
    },
    /// Mode switch requested during the cooldown and ignored
    SwitchSuppressed {
        /// Mode that was requested
        mode: DriveMode,
    },
    /// Mode switch dropped because the send queue had no room
    QueueFull {
        /// Mode that was requested
        mode: DriveMode,
    },
}

impl Event {
    /// Check if this event queued new button presses
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Event::SwitchScheduled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled() {
        let event = Event::SwitchScheduled {
            mode: DriveMode::Hold,
            presses: 4,
            speed: 60,
        };
        assert!(event.is_scheduled());
    }

    #[test]
    fn test_not_scheduled() {
        assert!(!Event::SwitchSuppressed { mode: DriveMode::Normal }.is_scheduled());
        assert!(!Event::QueueFull { mode: DriveMode::Hold }.is_scheduled());
        assert!(!Event::SampleDiscarded { speed: 60 }.is_scheduled());
    }
}
