//! Haptic actuator channels and dispatch.
//!
//! Actuators are fire-and-forget: there is no acknowledgement and a running
//! vibration does not decay on its own. [`HapticDispatcher`] sits between a
//! per-frame intensity and one channel. It throttles `enter` calls to the
//! actuator refresh rate and sends exactly one `exit` when the intensity drops
//! to zero.

use crate::error::{FeedbackError, Result};
use hand_tracking::{Finger, Handedness};
use nalgebra::Vector3;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of motors on a forearm band.
pub const FOREARM_MOTORS: usize = 6;

/// Digit index of the palm channel.
pub const PALM_DIGIT: u8 = 5;

/// What part of a hand a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChannelTarget {
    /// Glove channel: 0 thumb .. 4 pinky, 5 palm.
    Digit(u8),
    /// Forearm band.
    Forearm,
}

/// An addressable actuator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HapticChannel {
    /// Which hand.
    pub side: Handedness,
    /// Which part of it.
    pub target: ChannelTarget,
}

impl HapticChannel {
    /// Glove channel `index` on `side`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::InvalidDigit`] for indices above 5.
    pub fn digit(side: Handedness, index: u8) -> Result<Self> {
        if index > PALM_DIGIT {
            return Err(FeedbackError::InvalidDigit { index });
        }
        Ok(Self {
            side,
            target: ChannelTarget::Digit(index),
        })
    }

    /// Glove channel for a fingertip.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn finger(side: Handedness, finger: Finger) -> Self {
        Self {
            side,
            target: ChannelTarget::Digit(finger.index() as u8),
        }
    }

    /// Forearm band on `side`.
    #[must_use]
    pub const fn forearm(side: Handedness) -> Self {
        Self {
            side,
            target: ChannelTarget::Forearm,
        }
    }
}

/// A device that can vibrate on channels.
pub trait HapticActuator {
    /// Start or update vibration on `channel`. The vector's direction selects
    /// or modulates motors; its length is the intensity in `[0, 1]`.
    fn enter(&mut self, channel: HapticChannel, vector: Vector3<f64>);

    /// Stop vibration on `channel`.
    fn exit(&mut self, channel: HapticChannel);
}

impl<A: HapticActuator + ?Sized> HapticActuator for &mut A {
    fn enter(&mut self, channel: HapticChannel, vector: Vector3<f64>) {
        (**self).enter(channel, vector);
    }

    fn exit(&mut self, channel: HapticChannel) {
        (**self).exit(channel);
    }
}

/// One call made on an actuator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorEvent {
    /// `enter(channel, vector)`.
    Enter {
        /// Target channel.
        channel: HapticChannel,
        /// Direction scaled by intensity.
        vector: Vector3<f64>,
    },
    /// `exit(channel)`.
    Exit {
        /// Target channel.
        channel: HapticChannel,
    },
}

/// Actuator that records every call. Used for headless runs and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingActuator {
    events: Vec<ActuatorEvent>,
}

impl RecordingActuator {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[ActuatorEvent] {
        &self.events
    }

    /// Number of `enter` calls.
    #[must_use]
    pub fn enter_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ActuatorEvent::Enter { .. }))
            .count()
    }

    /// Number of `exit` calls.
    #[must_use]
    pub fn exit_count(&self) -> usize {
        self.events.len() - self.enter_count()
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl HapticActuator for RecordingActuator {
    fn enter(&mut self, channel: HapticChannel, vector: Vector3<f64>) {
        self.events.push(ActuatorEvent::Enter { channel, vector });
    }

    fn exit(&mut self, channel: HapticChannel) {
        self.events.push(ActuatorEvent::Exit { channel });
    }
}

/// What [`HapticDispatcher::dispatch`] sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchAction {
    /// Nothing; the channel is already stopped.
    Idle,
    /// `enter` was sent.
    Entered,
    /// Active, but the refresh interval has not elapsed.
    Throttled,
    /// `exit` was sent.
    Exited,
}

/// Rate-limited driver for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticDispatcher {
    channel: HapticChannel,
    refresh_interval: f64,
    since_enter: f64,
    active: bool,
}

impl HapticDispatcher {
    /// A stopped dispatcher for `channel`.
    #[must_use]
    pub const fn new(channel: HapticChannel, refresh_interval: f64) -> Self {
        Self {
            channel,
            refresh_interval,
            since_enter: 0.0,
            active: false,
        }
    }

    /// The driven channel.
    #[must_use]
    pub const fn channel(&self) -> HapticChannel {
        self.channel
    }

    /// True between an `enter` and the following `exit`.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Drive the channel with `vector` (length = intensity) for this tick.
    pub fn dispatch<A: HapticActuator + ?Sized>(
        &mut self,
        dt: f64,
        vector: Vector3<f64>,
        actuator: &mut A,
    ) -> DispatchAction {
        if dt.is_finite() && dt > 0.0 {
            self.since_enter += dt;
        }

        let intensity = vector.norm();
        if !(intensity.is_finite() && intensity > 0.0) {
            return self.stop(actuator);
        }

        if self.active && self.since_enter < self.refresh_interval {
            return DispatchAction::Throttled;
        }

        if !self.active {
            debug!(channel = ?self.channel, intensity, "haptic channel on");
        }
        actuator.enter(self.channel, vector);
        self.active = true;
        self.since_enter = 0.0;
        DispatchAction::Entered
    }

    /// Send `exit` if the channel is running.
    pub fn stop<A: HapticActuator + ?Sized>(&mut self, actuator: &mut A) -> DispatchAction {
        if !self.active {
            return DispatchAction::Idle;
        }
        actuator.exit(self.channel);
        self.active = false;
        debug!(channel = ?self.channel, "haptic channel off");
        DispatchAction::Exited
    }
}

/// Per-motor levels for a forearm band on the device's 1..=100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorPattern {
    levels: [u8; FOREARM_MOTORS],
}

impl MotorPattern {
    /// Every motor at the level for `intensity` in `[0, 1]`.
    ///
    /// Zero (or muted) intensity switches all motors off; any positive
    /// intensity maps to at least level 1.
    ///
    /// # Example
    ///
    /// ```
    /// use tube_feedback::MotorPattern;
    ///
    /// assert_eq!(MotorPattern::uniform(1.0).levels(), &[100; 6]);
    /// assert_eq!(MotorPattern::uniform(0.01).levels(), &[1; 6]);
    /// assert!(MotorPattern::uniform(0.0).is_off());
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn uniform(intensity: f64) -> Self {
        if !(intensity.is_finite() && intensity > 0.0) {
            return Self::default();
        }
        let level = (intensity.min(1.0) * 100.0).round().clamp(1.0, 100.0) as u8;
        Self {
            levels: [level; FOREARM_MOTORS],
        }
    }

    /// Motor levels.
    #[must_use]
    pub const fn levels(&self) -> &[u8; FOREARM_MOTORS] {
        &self.levels
    }

    /// True when every motor is off.
    #[must_use]
    pub fn is_off(&self) -> bool {
        self.levels.iter().all(|&l| l == 0)
    }
}
