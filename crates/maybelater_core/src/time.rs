//! Time types for MAYBELATER.
//!
//! Scheduling works on wall-clock timestamps. All arithmetic saturates
//! at the epoch so that retroactive writes far in the past stay ordered.

use serde::{Deserialize, Serialize};

/// Wall clock timestamp, seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: u64,
    pub nanos: u32,
}

impl Timestamp {
    /// Maximum nanoseconds per second
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    /// Create a new timestamp
    #[must_use]
    pub fn new(seconds: u64, nanos: u32) -> Self {
        let extra = u64::from(nanos / Self::NANOS_PER_SEC);
        Self {
            seconds: seconds.saturating_add(extra),
            nanos: nanos % Self::NANOS_PER_SEC,
        }
    }

    /// Timestamp at the epoch
    #[must_use]
    pub const fn epoch() -> Self {
        Self { seconds: 0, nanos: 0 }
    }

    /// Get current timestamp
    #[must_use]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: duration.as_secs(),
            nanos: duration.subsec_nanos(),
        }
    }

    /// Create from total nanoseconds since the epoch
    #[must_use]
    pub fn from_nanos(nanos: u128) -> Self {
        let per_sec = u128::from(Self::NANOS_PER_SEC);
        let seconds = u64::try_from(nanos / per_sec).unwrap_or(u64::MAX);
        Self {
            seconds,
            nanos: (nanos % per_sec) as u32,
        }
    }

    /// Total nanoseconds since the epoch
    #[must_use]
    pub const fn as_nanos(&self) -> u128 {
        self.seconds as u128 * 1_000_000_000 + self.nanos as u128
    }

    /// Seconds since the epoch as a float
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.nanos) / f64::from(Self::NANOS_PER_SEC)
    }

    /// Get duration since another timestamp, zero if `earlier` is later
    #[must_use]
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        Duration::from_nanos(self.as_nanos().saturating_sub(earlier.as_nanos()))
    }

    /// Add a duration
    #[must_use]
    pub fn add(&self, duration: &Duration) -> Self {
        Self::from_nanos(self.as_nanos().saturating_add(duration.as_nanos()))
    }

    /// Subtract a duration, saturating at the epoch
    #[must_use]
    pub fn sub(&self, duration: &Duration) -> Self {
        Self::from_nanos(self.as_nanos().saturating_sub(duration.as_nanos()))
    }

    /// Shift by a signed number of seconds
    ///
    /// Positive values move forward, negative values move into the past.
    #[must_use]
    pub fn shifted_secs(&self, secs: f64) -> Self {
        if secs >= 0.0 {
            self.add(&Duration::from_secs_f64(secs))
        } else {
            self.sub(&Duration::from_secs_f64(-secs))
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::epoch()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// A non-negative duration between timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration {
    pub seconds: u64,
    pub nanos: u32,
}

impl Duration {
    /// Create a new duration
    #[must_use]
    pub const fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Zero duration
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            seconds: 0,
            nanos: 0,
        }
    }

    /// Duration from seconds
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self {
            seconds,
            nanos: 0,
        }
    }

    /// Duration from milliseconds
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            seconds: millis / 1_000,
            nanos: ((millis % 1_000) * 1_000_000) as u32,
        }
    }

    /// Duration from total nanoseconds
    #[must_use]
    pub fn from_nanos(nanos: u128) -> Self {
        let per_sec = u128::from(Timestamp::NANOS_PER_SEC);
        Self {
            seconds: u64::try_from(nanos / per_sec).unwrap_or(u64::MAX),
            nanos: (nanos % per_sec) as u32,
        }
    }

    /// Duration from fractional seconds
    ///
    /// Negative and NaN inputs clamp to zero.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        if !(secs > 0.0) {
            return Self::zero();
        }
        let nanos = (secs * f64::from(Timestamp::NANOS_PER_SEC)).round();
        if nanos >= u128::MAX as f64 {
            return Self::new(u64::MAX, 0);
        }
        Self::from_nanos(nanos as u128)
    }

    /// Get whole seconds
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// Get fractional seconds
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.nanos) / f64::from(Timestamp::NANOS_PER_SEC)
    }

    /// Get total nanoseconds
    #[must_use]
    pub fn as_nanos(&self) -> u128 {
        self.seconds as u128 * 1_000_000_000 + self.nanos as u128
    }

    /// Whether this duration is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Convert to a `std::time::Duration` for sleeping
    #[must_use]
    pub const fn to_std(&self) -> std::time::Duration {
        std::time::Duration::new(self.seconds, self.nanos)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.seconds == 0 && self.nanos == 0 {
            write!(f, "0s")
        } else if self.seconds == 0 {
            write!(f, "{}ns", self.nanos)
        } else if self.nanos == 0 {
            write!(f, "{}s", self.seconds)
        } else {
            write!(f, "{}.{:09}s", self.seconds, self.nanos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_duration() {
        let d = Duration::from_secs(60);
        assert_eq!(d.as_secs(), 60);
        assert_eq!(d, Duration::from_millis(60_000));

        let d2 = Duration::from_millis(1500);
        assert_eq!(d2.as_secs(), 1);
        assert_eq!(d2.as_nanos(), 1_500_000_000);
    }

    #[test]
    fn test_duration_from_secs_f64() {
        assert_eq!(Duration::from_secs_f64(0.001), Duration::from_millis(1));
        assert_eq!(Duration::from_secs_f64(1.5), Duration::from_millis(1500));
        assert!(Duration::from_secs_f64(-3.0).is_zero());
        assert!(Duration::from_secs_f64(f64::NAN).is_zero());
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let t1 = Timestamp::new(100, 500_000_000); // 100.5s
        let t2 = Timestamp::new(102, 200_000_000); // 102.2s

        let duration = t2.duration_since(&t1);
        assert_eq!(duration.seconds, 1);
        assert_eq!(duration.nanos, 700_000_000);

        let t3 = t1.add(&duration);
        assert_eq!(t3, t2);
        assert_eq!(t2.sub(&duration), t1);
    }

    #[test]
    fn test_duration_since_later_is_zero() {
        let t1 = Timestamp::new(100, 0);
        let t2 = Timestamp::new(50, 0);
        assert!(t2.duration_since(&t1).is_zero());
    }

    #[test]
    fn test_timestamp_nano_overflow() {
        let t = Timestamp::new(100, 900_000_000);
        let d = Duration::new(0, 200_000_000);

        let t2 = t.add(&d);
        assert_eq!(t2.seconds, 101);
        assert_eq!(t2.nanos, 100_000_000);
    }

    #[test]
    fn test_shifted_secs() {
        let t = Timestamp::new(1_000, 0);
        assert_eq!(t.shifted_secs(100.0), Timestamp::new(1_100, 0));
        assert_eq!(t.shifted_secs(-100.0), Timestamp::new(900, 0));
        // Saturates at the epoch
        assert_eq!(t.shifted_secs(-5_000.0), Timestamp::epoch());
    }

    proptest! {
        #[test]
        fn prop_shift_is_monotonic(base in 1_000_000u64..2_000_000, secs in 0.0f64..10_000.0) {
            let t = Timestamp::new(base, 0);
            prop_assert!(t.shifted_secs(secs) >= t);
            prop_assert!(t.shifted_secs(-secs) <= t);
        }
    }
}
