//! Clocks.
//!
//! "Blocking" in the runtime is literal sleeping. Routing it through a
//! [`Clock`] lets tests run procrastination and deadline scenarios in
//! simulated time, where a sleep only moves the clock forward.

use maybelater_core::{Duration, Timestamp};
use std::sync::{Arc, Mutex};

/// Source of the current time and of sleeping
pub trait Clock {
    /// Current wall-clock time
    fn now(&self) -> Timestamp;

    /// Block for `duration`
    fn sleep(&self, duration: Duration);
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration.to_std());
        }
    }
}

/// Simulated clock shared between clones
///
/// `sleep` advances the shared time instantly.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Arbitrary fixed start, far enough from the epoch for retroactive writes
    pub const DEFAULT_START: Timestamp = Timestamp {
        seconds: 1_700_000_000,
        nanos: 0,
    };

    /// Create a clock starting at `start`
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.add(&duration);
    }

    /// Move the clock forward by fractional seconds
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    /// Set the clock to an absolute time
    pub fn set(&self, at: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_START)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: Duration) {
        tracing::trace!(%duration, "simulated sleep");
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_sleep_advances() {
        let clock = ManualClock::default();
        let start = clock.now();
        clock.sleep(Duration::from_millis(1500));
        assert_eq!(clock.now().duration_since(&start), Duration::from_millis(1500));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let other = clock.clone();
        other.advance_secs(30.0);
        assert_eq!(clock.now(), other.now());
        assert_eq!(clock.now().seconds, ManualClock::DEFAULT_START.seconds + 30);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        clock.sleep(Duration::from_millis(1));
        assert!(clock.now() >= a);
    }
}
