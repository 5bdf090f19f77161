//! Session time.
//!
//! The frame loop hands every component a `dt` in seconds. Timestamps are
//! kept as integer nanoseconds so that accumulating many small frame steps
//! does not drift the way a running `f64` sum does.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nanosecond-precision point on the session timeline.
///
/// # Example
///
/// ```
/// use hand_tracking::Timestamp;
///
/// let ts = Timestamp::from_secs_f64(1.5);
/// assert_eq!(ts.as_nanos(), 1_500_000_000);
/// assert!((ts.as_secs_f64() - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// The start of the session timeline.
    pub const ZERO: Self = Self { nanos: 0 };

    /// Creates a timestamp from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a timestamp from seconds. Negative and NaN inputs map to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).round().max(0.0) as u64;
        Self { nanos }
    }

    /// Returns the timestamp as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the timestamp as seconds.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Seconds elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[must_use]
    pub fn secs_since(self, earlier: Self) -> f64 {
        self.nanos.saturating_sub(earlier.nanos) as f64 / 1e9
    }
}

/// Monotonic clock advanced by frame steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionClock {
    now: Timestamp,
}

impl SessionClock {
    /// A clock at [`Timestamp::ZERO`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Timestamp::ZERO,
        }
    }

    /// Current time.
    #[must_use]
    pub const fn now(&self) -> Timestamp {
        self.now
    }

    /// Advance by `dt` seconds and return the new time.
    ///
    /// Non-positive or non-finite steps leave the clock unchanged.
    pub fn advance(&mut self, dt: f64) -> Timestamp {
        if dt.is_finite() && dt > 0.0 {
            let step = Timestamp::from_secs_f64(dt).as_nanos();
            self.now = Timestamp::from_nanos(self.now.as_nanos().saturating_add(step));
        }
        self.now
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        self.now = Timestamp::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_does_not_drift() {
        let mut clock = SessionClock::new();
        for _ in 0..6000 {
            clock.advance(1.0 / 60.0);
        }
        // 6000 frames at 60 Hz, each rounded to the nearest nanosecond
        assert_relative_eq!(clock.now().as_secs_f64(), 100.0, epsilon = 1e-5);
    }

    #[test]
    fn test_clock_ignores_bad_steps() {
        let mut clock = SessionClock::new();
        clock.advance(0.5);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.now(), Timestamp::from_nanos(500_000_000));

        clock.reset();
        assert_eq!(clock.now(), Timestamp::ZERO);
    }

    #[test]
    fn test_secs_since_saturates() {
        let a = Timestamp::from_secs_f64(2.0);
        let b = Timestamp::from_secs_f64(3.25);
        assert_relative_eq!(b.secs_since(a), 1.25);
        assert_relative_eq!(a.secs_since(b), 0.0);
        assert_eq!(Timestamp::from_secs_f64(-4.0), Timestamp::ZERO);
    }
}
