//! Per-finger glove feedback.
//!
//! While the patient holds the object, each fingertip is checked against a
//! margin around the tube (`radius * hard_factor`). A fingertip past the
//! margin vibrates its glove channel with the vector from the nearest curve
//! point to the fingertip; a fingertip back inside stops its channel.

use crate::actuator::{HapticActuator, HapticChannel, HapticDispatcher};
use crate::config::{HapticConfig, TrackingConfig};
use crate::tube::ToleranceTube;
use hand_tracking::{Finger, HandPose, Handedness};
use nalgebra::Vector3;
use tracing::debug;

/// Glove feedback for the five fingertips of one hand.
#[derive(Debug, Clone)]
pub struct FingertipMonitor {
    side: Handedness,
    dispatchers: [HapticDispatcher; 5],
    active: bool,
}

impl FingertipMonitor {
    /// An inactive monitor for `side`.
    #[must_use]
    pub fn new(side: Handedness, haptics: &HapticConfig) -> Self {
        let dispatchers = Finger::ALL.map(|finger| {
            HapticDispatcher::new(HapticChannel::finger(side, finger), haptics.refresh_interval)
        });
        Self {
            side,
            dispatchers,
            active: false,
        }
    }

    /// Which hand is monitored.
    #[must_use]
    pub const fn side(&self) -> Handedness {
        self.side
    }

    /// True once [`Self::activate`] has been called.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Start monitoring (on grab).
    pub fn activate(&mut self) {
        if !self.active {
            debug!(side = %self.side, "fingertip monitor active");
        }
        self.active = true;
    }

    /// Stop monitoring and silence every channel.
    pub fn deactivate<A: HapticActuator + ?Sized>(&mut self, actuator: &mut A) {
        for dispatcher in &mut self.dispatchers {
            dispatcher.stop(actuator);
        }
        self.active = false;
    }

    /// Check every fingertip of `pose` and drive the glove.
    ///
    /// Returns the per-finger offset vectors from the curve for fingertips
    /// outside the margin. Does nothing while inactive, for the other hand,
    /// or for a pose with non-finite coordinates.
    pub fn update<A: HapticActuator + ?Sized>(
        &mut self,
        pose: &HandPose,
        tube: &ToleranceTube,
        tracking: &TrackingConfig,
        dt: f64,
        actuator: &mut A,
    ) -> [Option<Vector3<f64>>; 5] {
        let mut outside = [None; 5];
        if !self.active || pose.side != self.side || !pose.is_finite() {
            return outside;
        }

        let margin = tube.radius() * tracking.hard_factor;
        for finger in Finger::ALL {
            let tip = pose.fingertip(finger);
            let hit = tube.nearest(&tip, tracking.nearest);
            let offset = tip - hit.point;
            let dispatcher = &mut self.dispatchers[finger.index()];

            if hit.distance > margin {
                dispatcher.dispatch(dt, offset, actuator);
                outside[finger.index()] = Some(offset);
            } else {
                dispatcher.dispatch(dt, Vector3::zeros(), actuator);
            }
        }
        outside
    }
}
