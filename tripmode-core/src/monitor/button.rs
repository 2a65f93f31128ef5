//! Drive mode button press counter
//!
//! Counts presses of the physical button (or of our own simulated ones) by
//! watching the button bit in the steering wheel message. A press is
//! counted when the button is released, so a held button counts once.

/// Drive mode button monitor
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMonitor {
    /// Button currently held
    pressed: bool,
    /// Completed presses
    press_count: u32,
}

impl ButtonMonitor {
    /// Create a new monitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with the button state from one frame
    ///
    /// Returns true if this sample completed a press.
    pub fn observe(&mut self, pressed: bool) -> bool {
        let released = self.pressed && !pressed;
        if released {
            self.press_count = self.press_count.saturating_add(1);
        }
        self.pressed = pressed;
        released
    }

    /// Check if the button is currently held
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Number of completed presses
    pub fn press_count(&self) -> u32 {
        self.press_count
    }
}
