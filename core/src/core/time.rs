//! Logical time for the simulation
//!
//! The simulation advances a logical clock from one event's timestamp to the
//! next, skipping idle time. Wall-clock time plays no role: a run over ten
//! simulated years and one over ten simulated milliseconds cost the same.

use serde::{Deserialize, Serialize};

/// Monotonic logical clock.
///
/// The clock starts at an epoch (0.0 unless the caller supplies one) and only
/// ever moves forward. Advancing to a timestamp at or before "now" is a no-op
/// rather than an error: an already-due event may fire without rewinding time.
///
/// # Example
/// ```
/// use des_core::SimClock;
///
/// let mut clock = SimClock::new(0.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(3.5);
/// assert_eq!(clock.now(), 3.5);
///
/// clock.advance_to(1.0); // already due; the clock never regresses
/// assert_eq!(clock.now(), 3.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Starting value of the clock
    epoch: f64,
    /// Current logical time, monotonically non-decreasing
    now: f64,
}

impl SimClock {
    /// Create a clock starting at `epoch`.
    ///
    /// Finiteness of the epoch is enforced by the scheduler's configuration
    /// validation, not here.
    pub fn new(epoch: f64) -> Self {
        Self { epoch, now: epoch }
    }

    /// Current logical time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// The clock's starting value.
    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Logical time elapsed since the epoch.
    pub fn elapsed(&self) -> f64 {
        self.now - self.epoch
    }

    /// Advance the clock to `time`, clamping so it never moves backwards.
    pub fn advance_to(&mut self, time: f64) {
        if time > self.now {
            self.now = time;
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut clock = SimClock::new(0.0);
        clock.advance_to(5.0);
        clock.advance_to(2.0);
        assert_eq!(clock.now(), 5.0);
    }

    #[test]
    fn test_negative_epoch() {
        let mut clock = SimClock::new(-10.0);
        assert_eq!(clock.now(), -10.0);
        clock.advance_to(-3.0);
        assert_eq!(clock.now(), -3.0);
        assert_eq!(clock.elapsed(), 7.0);
    }
}
