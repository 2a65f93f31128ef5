//! Drive mode definitions
//!
//! The vehicle's mode selector cycles through a fixed order. The menu is
//! closed by default and always reopens on NORMAL, so the position of a mode
//! in this order is also how far it is from NORMAL in button presses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of drive modes
pub const MODE_COUNT: usize = 4;

/// Drive modes in selector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DriveMode {
    /// Default mode, selected when the menu opens
    #[default]
    Normal,
    /// Sharper throttle response
    Sport,
    /// Keeps a battery reserve for climbs
    Mountain,
    /// Holds the battery charge, runs on the engine
    Hold,
}

impl DriveMode {
    /// All modes in selector order
    pub const ALL: [DriveMode; MODE_COUNT] = [
        DriveMode::Normal,
        DriveMode::Sport,
        DriveMode::Mountain,
        DriveMode::Hold,
    ];

    /// Position in the selector (NORMAL = 0)
    pub const fn index(self) -> usize {
        match self {
            DriveMode::Normal => 0,
            DriveMode::Sport => 1,
            DriveMode::Mountain => 2,
            DriveMode::Hold => 3,
        }
    }

    /// Look up a mode by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
    }

    /// Mode selected by one more press, wrapping HOLD back to NORMAL
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % MODE_COUNT]
    }

    /// Whether the speed threshold switches into or out of this mode
    ///
    /// SPORT and MOUNTAIN are only ever chosen by hand.
    pub fn is_automatic(self) -> bool {
        matches!(self, DriveMode::Normal | DriveMode::Hold)
    }

    /// Upper-case display name
    pub fn name(self) -> &'static str {
        match self {
            DriveMode::Normal => "NORMAL",
            DriveMode::Sport => "SPORT",
            DriveMode::Mountain => "MOUNTAIN",
            DriveMode::Hold => "HOLD",
        }
    }
}

impl core::fmt::Display for DriveMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order() {
        for (i, mode) in DriveMode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DriveMode::from_name("HOLD"), Some(DriveMode::Hold));
        assert_eq!(DriveMode::from_name("sport"), Some(DriveMode::Sport));
        assert_eq!(DriveMode::from_name("Mountain"), Some(DriveMode::Mountain));
        assert_eq!(DriveMode::from_name("eco"), None);
        for mode in DriveMode::ALL {
            assert_eq!(DriveMode::from_name(mode.name()), Some(mode));
        }
    }

    #[test]
    fn test_next_cycles() {
        let mut mode = DriveMode::Normal;
        mode = mode.next();
        assert_eq!(mode, DriveMode::Sport);
        mode = mode.next();
        assert_eq!(mode, DriveMode::Mountain);
        mode = mode.next();
        assert_eq!(mode, DriveMode::Hold);
        mode = mode.next();
        assert_eq!(mode, DriveMode::Normal);
    }

    #[test]
    fn test_automatic_modes() {
        assert!(DriveMode::Normal.is_automatic());
        assert!(DriveMode::Hold.is_automatic());
        assert!(!DriveMode::Sport.is_automatic());
        assert!(!DriveMode::Mountain.is_automatic());
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(DriveMode::default(), DriveMode::Normal);
        assert_eq!(DriveMode::Hold.name(), "HOLD");
    }
}
