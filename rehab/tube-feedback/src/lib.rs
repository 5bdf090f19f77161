//! Tolerance-tube tracking and haptic feedback.
//!
//! A patient steers a held object along a guide spline. This crate decides,
//! frame by frame, how far off they are and what the haptic devices should
//! do about it:
//!
//! - [`ToleranceTube`] - Guide spline plus a radius that only grows
//! - [`ToleranceTracker`] - Zone classification, exit counting, adaptive
//!   radius growth and time-inside accounting
//! - [`HapticIntensityMapper`] / [`SaturationGuard`] - Distance to intensity,
//!   with a mute after prolonged stimulation
//! - [`HapticActuator`] / [`HapticDispatcher`] - Channel addressing and
//!   refresh-rate limited dispatch
//! - [`FingertipMonitor`] - Per-finger glove feedback
//!
//! # Example
//!
//! ```
//! use tube_feedback::{HapticConfig, ToleranceTracker, ToleranceTube, TrackingConfig, Zone};
//! use trajectory_curve::SmoothSpline;
//! use nalgebra::Point3;
//!
//! let curve = SmoothSpline::through_knots(&[
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.5, 0.1, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//! ]).unwrap();
//!
//! let mut tracker = ToleranceTracker::new(TrackingConfig::default(), HapticConfig::default());
//! tracker.install_tube(ToleranceTube::with_default_radius(curve));
//!
//! let update = tracker.update(Some(Point3::new(0.0, 0.3, 0.0)), 1.0 / 60.0);
//! assert_eq!(update.zone, Zone::OutsideHard);
//! assert_eq!(update.error_delta, 1);
//! assert!(update.intensity > 0.0);
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for configs and zones

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(clippy::suboptimal_flops)]

mod actuator;
mod config;
mod error;
mod fingertips;
mod haptics;
mod tracker;
mod tube;
mod zone;

pub use actuator::{
    ActuatorEvent, ChannelTarget, DispatchAction, FOREARM_MOTORS, HapticActuator, HapticChannel,
    HapticDispatcher, MotorPattern, PALM_DIGIT, RecordingActuator,
};
pub use config::{
    DEFAULT_RADIUS, GrowthRule, HapticConfig, MAX_RADIUS, MIN_RADIUS, ToleranceMode,
    TrackingConfig, TubeBounds,
};
pub use error::{FeedbackError, Result};
pub use fingertips::FingertipMonitor;
pub use haptics::{HapticIntensityMapper, SaturationGuard};
pub use tracker::{ToleranceTracker, TrackingStats, TrackingUpdate};
pub use tube::{ToleranceTube, round_to_mm};
pub use zone::{Zone, ZoneRadii};
