//! Controller configuration
//!
//! All fields have working defaults, so a host only needs to override the
//! values it cares about.

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sequencer::MAX_PRESSES;

/// Default speed threshold (whole speed units)
pub const DEFAULT_SPEED_THRESHOLD: i32 = 50;

/// Default minimum time between two mode switches (ms)
pub const DEFAULT_MODE_SWITCH_COOLDOWN_MS: u32 = 60_000;

/// Mode switch cooldown used by the debug preset (ms)
pub const DEBUG_MODE_SWITCH_COOLDOWN_MS: u32 = 30_000;

/// Default minimum time between two button presses (ms)
///
/// The physical control does not register presses faster than this.
pub const DEFAULT_PRESS_COOLDOWN_MS: u32 = 500;

/// Controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Speed above which HOLD is requested, at or below which NORMAL is
    pub speed_threshold: i32,
    /// Minimum time between two mode switches (ms)
    pub mode_switch_cooldown_ms: u32,
    /// Minimum time between two button presses (ms)
    pub press_cooldown_ms: u32,
    /// Bus the simulated presses are sent on
    pub bus: u8,
    /// Toggle NORMAL/HOLD on every speed sample instead of using the threshold
    ///
    /// Also arms the first mode switch immediately instead of after one
    /// cooldown.
    pub debug: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            speed_threshold: DEFAULT_SPEED_THRESHOLD,
            mode_switch_cooldown_ms: DEFAULT_MODE_SWITCH_COOLDOWN_MS,
            press_cooldown_ms: DEFAULT_PRESS_COOLDOWN_MS,
            bus: 0,
            debug: false,
        }
    }
}

impl ControllerConfig {
    /// Bench-testing preset: toggles on every speed sample, 30 s cooldown
    pub fn debug_preset() -> Self {
        Self::default().into_debug()
    }

    /// Same settings with debug toggling and its shorter cooldown
    pub fn into_debug(self) -> Self {
        Self {
            mode_switch_cooldown_ms: DEBUG_MODE_SWITCH_COOLDOWN_MS,
            debug: true,
            ..self
        }
    }

    /// Whether the longest press sequence is sent before the next switch
    ///
    /// Presses go out one per press cooldown, paced by received frames. As
    /// long as frames arrive often enough for the whole sequence to fit in
    /// the mode switch cooldown, at most one request's presses are left
    /// when the next switch is scheduled, and the send queue never fills.
    pub fn drains_within_cooldown(&self) -> bool {
        let drain_ms = self.press_cooldown_ms as u64 * MAX_PRESSES as u64;
        drain_ms < self.mode_switch_cooldown_ms as u64
    }

    /// Mode switch cooldown as a duration
    pub fn mode_switch_cooldown(&self) -> Duration {
        Duration::from_millis(self.mode_switch_cooldown_ms as u64)
    }

    /// Press cooldown as a duration
    pub fn press_cooldown(&self) -> Duration {
        Duration::from_millis(self.press_cooldown_ms as u64)
    }
}
