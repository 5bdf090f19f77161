//! Which hand holds the guided object.
//!
//! The first contact after a session starts decides the hand and stamps the
//! session start time. After that the hand is fixed for the session: later
//! contacts, from either hand, are ignored. Only [`GrabStateMachine::force_release`]
//! (an administrative stop) or [`GrabStateMachine::reset`] (a new session)
//! leave the held state. A release stamps the session end and keeps the hand
//! that held the object, so the session can still be scored and stored.

use hand_tracking::{Handedness, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Holder of the guided object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabState {
    /// Nobody holds it.
    #[default]
    Unheld,
    /// Held by the left hand.
    HeldByLeft,
    /// Held by the right hand.
    HeldByRight,
}

impl GrabState {
    /// The held state for `side`.
    #[must_use]
    pub const fn held_by(side: Handedness) -> Self {
        match side {
            Handedness::Left => Self::HeldByLeft,
            Handedness::Right => Self::HeldByRight,
        }
    }

    /// The holding hand, if any.
    #[must_use]
    pub const fn hand(self) -> Option<Handedness> {
        match self {
            Self::Unheld => None,
            Self::HeldByLeft => Some(Handedness::Left),
            Self::HeldByRight => Some(Handedness::Right),
        }
    }

    /// `"none"`, `"left"` or `"right"`, as stored with session records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unheld => "none",
            Self::HeldByLeft => "left",
            Self::HeldByRight => "right",
        }
    }
}

/// Grab tracking for one session.
///
/// # Example
///
/// ```
/// use hand_tracking::{Handedness, Timestamp};
/// use rehab_session::{GrabState, GrabStateMachine};
///
/// let mut grab = GrabStateMachine::new();
/// assert!(grab.on_contact(Handedness::Left, Timestamp::from_secs_f64(2.0)));
/// assert!(!grab.on_contact(Handedness::Right, Timestamp::from_secs_f64(3.0)));
/// assert_eq!(grab.state(), GrabState::HeldByLeft);
/// assert_eq!(grab.started_at(), Some(Timestamp::from_secs_f64(2.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrabStateMachine {
    state: GrabState,
    hand: Option<Handedness>,
    started_at: Option<Timestamp>,
    finished_at: Option<Timestamp>,
    released: bool,
}

impl GrabStateMachine {
    /// Unheld, session not started.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GrabState::Unheld,
            hand: None,
            started_at: None,
            finished_at: None,
            released: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GrabState {
        self.state
    }

    /// The holding hand, if any.
    #[must_use]
    pub const fn holder(&self) -> Option<Handedness> {
        self.state.hand()
    }

    /// The hand that grabbed the object this session. Kept after a release.
    #[must_use]
    pub const fn hand(&self) -> Option<Handedness> {
        self.hand
    }

    /// True while a hand holds the object.
    #[must_use]
    pub const fn is_held(&self) -> bool {
        !matches!(self.state, GrabState::Unheld)
    }

    /// Session start, stamped by the first contact.
    #[must_use]
    pub const fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Session end, stamped by the first [`Self::force_release`] after a grab.
    #[must_use]
    pub const fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    /// True after [`Self::force_release`] until [`Self::reset`].
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// A hand touched the object at `now`. Returns true when this contact
    /// assigned the holder.
    pub fn on_contact(&mut self, side: Handedness, now: Timestamp) -> bool {
        if self.is_held() || self.released {
            return false;
        }
        self.state = GrabState::held_by(side);
        self.hand = Some(side);
        self.started_at = Some(now);
        info!(hand = %side, at = now.as_secs_f64(), "object grabbed, session started");
        true
    }

    /// Administrative release at `now`: drop the object and ignore contacts
    /// until the next [`Self::reset`]. The start stamp and the hand are kept
    /// for scoring; the end is stamped once, if the session had started.
    pub fn force_release(&mut self, now: Timestamp) {
        if self.is_held() {
            info!(hand = self.state.as_str(), at = now.as_secs_f64(), "object force-released");
        }
        if self.started_at.is_some() && self.finished_at.is_none() {
            self.finished_at = Some(now);
        }
        self.state = GrabState::Unheld;
        self.released = true;
    }

    /// Back to a fresh session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
