//! Monotonic clock trait

use crate::time::Instant;

/// Trait for monotonic time sources
///
/// Implementations must never go backwards. Wall-clock time is not suitable
/// because it jumps when the system clock is adjusted.
pub trait Clock {
    /// Current time
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
