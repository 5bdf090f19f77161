//! Waiting for external systems.
//!
//! Hand tracking, the spawned table anchor and stored data all become valid
//! at some unknown later frame. [`ReadinessPoll`] probes once per tick and,
//! after a failed probe, waits a fixed backoff before the next one. There is
//! no attempt cap: the poll waits for as long as it takes unless cancelled.

use crate::cancel::CancelToken;
use tracing::debug;

/// Default delay after a failed probe, in seconds.
pub const DEFAULT_BACKOFF: f64 = 0.25;

/// Result of one [`ReadinessPoll::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState<T> {
    /// Not ready yet; poll again next tick.
    Waiting,
    /// The probe succeeded.
    Ready(T),
    /// The cancel token fired.
    Cancelled,
}

impl<T> ReadinessState<T> {
    /// True for [`ReadinessState::Waiting`].
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// The ready value, if any.
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Waiting | Self::Cancelled => None,
        }
    }
}

/// Poll-with-backoff primitive.
///
/// # Example
///
/// ```
/// use hand_tracking::{ReadinessPoll, ReadinessState};
///
/// let mut poll = ReadinessPoll::new(0.25);
/// assert_eq!(poll.poll(0.016, || None::<u32>), ReadinessState::Waiting);
/// // Backing off: the probe is not called until 0.25 s have passed
/// assert_eq!(poll.poll(0.1, || Some(7)), ReadinessState::Waiting);
/// assert_eq!(poll.poll(0.2, || Some(7)), ReadinessState::Ready(7));
/// assert_eq!(poll.attempts(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ReadinessPoll {
    backoff: f64,
    cooldown: f64,
    attempts: u64,
    token: CancelToken,
}

impl Default for ReadinessPoll {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF)
    }
}

impl ReadinessPoll {
    /// A poll that waits `backoff` seconds after each failed probe.
    #[must_use]
    pub fn new(backoff: f64) -> Self {
        Self {
            backoff: if backoff.is_finite() { backoff.max(0.0) } else { DEFAULT_BACKOFF },
            cooldown: 0.0,
            attempts: 0,
            token: CancelToken::new(),
        }
    }

    /// Observe `token` for cancellation.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// Number of probes made so far.
    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Advance by `dt` and probe if the backoff has elapsed.
    pub fn poll<T, F>(&mut self, dt: f64, probe: F) -> ReadinessState<T>
    where
        F: FnOnce() -> Option<T>,
    {
        if self.token.is_cancelled() {
            return ReadinessState::Cancelled;
        }

        if self.cooldown > 0.0 {
            if dt.is_finite() && dt > 0.0 {
                self.cooldown -= dt;
            }
            if self.cooldown > 0.0 {
                return ReadinessState::Waiting;
            }
        }

        self.attempts += 1;
        match probe() {
            Some(value) => {
                debug!(attempts = self.attempts, "external dependency ready");
                ReadinessState::Ready(value)
            }
            None => {
                self.cooldown = self.backoff;
                ReadinessState::Waiting
            }
        }
    }

    /// Clear the backoff and attempt count.
    pub fn reset(&mut self) {
        self.cooldown = 0.0;
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_indefinitely() {
        let mut poll = ReadinessPoll::new(0.25);
        for _ in 0..10_000 {
            assert!(poll.poll(0.1, || None::<()>).is_waiting());
        }
        // One probe every third tick of 0.1 s
        assert!(poll.attempts() >= 3000);
        assert_eq!(poll.poll(1.0, || Some("tracking")).ready(), Some("tracking"));
    }

    #[test]
    fn test_zero_backoff_probes_every_tick() {
        let mut poll = ReadinessPoll::new(0.0);
        for _ in 0..5 {
            poll.poll(0.016, || None::<()>);
        }
        assert_eq!(poll.attempts(), 5);
    }

    #[test]
    fn test_cancellation() {
        let token = CancelToken::new();
        let mut poll = ReadinessPoll::default().with_cancel(token.clone());
        assert!(poll.poll(0.016, || None::<()>).is_waiting());

        token.cancel();
        assert_eq!(poll.poll(1.0, || Some(())), ReadinessState::Cancelled);
    }

    #[test]
    fn test_reset() {
        let mut poll = ReadinessPoll::default();
        poll.poll(0.0, || None::<()>);
        poll.reset();
        assert_eq!(poll.attempts(), 0);
        assert_eq!(poll.poll(0.0, || Some(1)), ReadinessState::Ready(1));
    }
}
