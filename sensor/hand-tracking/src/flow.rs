//! Guided recording flow for the therapist.
//!
//! ```text
//! Idle --begin--> Waiting --grab--> Countdown --3 s--> Recording --5 s--> Post
//!   ^                ^                                                     |
//!   |                +-------------------- retry --------------------------+
//!   +------------------------------------- cancel (from any state) -------+
//! ```
//!
//! The flow only decides *when* to sample; the caller owns the
//! [`Sampler`](crate::Sampler) and reacts to the returned [`FlowEvent`]s.

use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default countdown before recording starts, in seconds.
pub const DEFAULT_COUNTDOWN: f64 = 3.0;

/// Default length of the recording window, in seconds.
pub const DEFAULT_RECORD_WINDOW: f64 = 5.0;

/// Timing of the recording flow.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecordingFlowConfig {
    /// Seconds between the grab and the start of sampling.
    pub countdown: f64,
    /// Seconds of sampling.
    pub record_window: f64,
}

impl Default for RecordingFlowConfig {
    fn default() -> Self {
        Self {
            countdown: DEFAULT_COUNTDOWN,
            record_window: DEFAULT_RECORD_WINDOW,
        }
    }
}

impl RecordingFlowConfig {
    /// Set the countdown length.
    #[must_use]
    pub const fn with_countdown(mut self, secs: f64) -> Self {
        self.countdown = secs;
        self
    }

    /// Set the recording window length.
    #[must_use]
    pub const fn with_record_window(mut self, secs: f64) -> Self {
        self.record_window = secs;
        self
    }
}

/// Where the flow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlowState {
    /// Nothing in progress.
    Idle,
    /// Waiting for the therapist to pick up the brush.
    Waiting,
    /// Counting down to the start of sampling.
    Countdown,
    /// Sampling.
    Recording,
    /// Recording finished; waiting for save, retry or cancel.
    Post,
}

/// Action the caller must take after a flow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    /// Nothing to do.
    None,
    /// Start the sampler now.
    StartSampling,
    /// Stop the sampler and keep the recording.
    StopSampling,
    /// Drop the current recording (running or finished).
    DiscardSampling,
}

/// State machine driving a timed recording.
///
/// # Example
///
/// ```
/// use hand_tracking::{FlowEvent, FlowState, RecordingFlow, RecordingFlowConfig};
///
/// let mut flow = RecordingFlow::new(RecordingFlowConfig::default());
/// flow.begin();
/// assert!(flow.on_grab());
/// assert_eq!(flow.remaining(), 3);
///
/// assert_eq!(flow.tick(3.0), FlowEvent::StartSampling);
/// assert_eq!(flow.state(), FlowState::Recording);
/// assert_eq!(flow.tick(5.0), FlowEvent::StopSampling);
/// assert_eq!(flow.state(), FlowState::Post);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingFlow {
    config: RecordingFlowConfig,
    state: FlowState,
    remaining: f64,
}

impl RecordingFlow {
    /// A flow in [`FlowState::Idle`].
    #[must_use]
    pub const fn new(config: RecordingFlowConfig) -> Self {
        Self {
            config,
            state: FlowState::Idle,
            remaining: 0.0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FlowState {
        self.state
    }

    /// Whole seconds left in the countdown or recording window, rounded up.
    /// Zero in every other state.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn remaining(&self) -> u32 {
        match self.state {
            FlowState::Countdown | FlowState::Recording => self.remaining.max(0.0).ceil() as u32,
            _ => 0,
        }
    }

    /// Arm the flow and wait for a grab.
    pub fn begin(&mut self) -> FlowEvent {
        let event = self.discard_event();
        self.set_state(FlowState::Waiting);
        event
    }

    /// The brush was grabbed. Returns true if this started the countdown.
    ///
    /// Grabs outside [`FlowState::Waiting`] are ignored.
    pub fn on_grab(&mut self) -> bool {
        if self.state != FlowState::Waiting {
            return false;
        }
        self.remaining = self.config.countdown;
        self.set_state(FlowState::Countdown);
        true
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> FlowEvent {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.state {
            FlowState::Countdown => {
                self.remaining -= dt;
                if self.remaining <= 0.0 {
                    self.remaining = self.config.record_window;
                    self.set_state(FlowState::Recording);
                    return FlowEvent::StartSampling;
                }
                FlowEvent::None
            }
            FlowState::Recording => {
                self.remaining -= dt;
                if self.remaining <= 0.0 {
                    self.remaining = 0.0;
                    self.set_state(FlowState::Post);
                    return FlowEvent::StopSampling;
                }
                FlowEvent::None
            }
            FlowState::Idle | FlowState::Waiting | FlowState::Post => FlowEvent::None,
        }
    }

    /// Throw away the attempt and wait for a new grab.
    pub fn retry(&mut self) -> FlowEvent {
        let event = self.discard_event();
        self.remaining = 0.0;
        self.set_state(FlowState::Waiting);
        event
    }

    /// Throw away the attempt and go idle.
    pub fn cancel(&mut self) -> FlowEvent {
        let event = self.discard_event();
        self.remaining = 0.0;
        self.set_state(FlowState::Idle);
        event
    }

    /// A saved recording returns the flow to idle.
    pub fn finish(&mut self) {
        if self.state == FlowState::Post {
            self.set_state(FlowState::Idle);
        }
    }

    fn discard_event(&self) -> FlowEvent {
        match self.state {
            FlowState::Recording | FlowState::Post => FlowEvent::DiscardSampling,
            FlowState::Idle | FlowState::Waiting | FlowState::Countdown => FlowEvent::None,
        }
    }

    fn set_state(&mut self, next: FlowState) {
        if next == self.state {
            return;
        }
        match next {
            FlowState::Recording | FlowState::Post => {
                info!(from = ?self.state, to = ?next, "recording flow");
            }
            _ => debug!(from = ?self.state, to = ?next, "recording flow"),
        }
        self.state = next;
    }
}
