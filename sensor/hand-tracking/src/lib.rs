//! Tracked-hand input for trajectory capture.
//!
//! The skeletal tracker itself is an external subsystem; this crate covers
//! what happens to its output:
//!
//! - [`HandPose`], [`Handedness`], [`Finger`] - Tracked hand data
//! - [`PositionSource`] - Per-tick position provider that may be "not yet valid"
//! - [`Sampler`] - Fixed-cadence sampling with minimum spacing into a
//!   [`RawTrajectory`]
//! - [`RecordingFlow`] - Countdown / record window / retry state machine
//! - [`ReadinessPoll`] - Poll-with-backoff for external dependencies
//! - [`CancelToken`] - Cooperative stop signal shared by the above
//! - [`SessionClock`] - Frame-step clock in integer nanoseconds
//!
//! # Scheduling
//!
//! Everything here runs on the caller's frame loop. Nothing spawns threads
//! or blocks; each component advances when its `tick`/`poll` is called with
//! the frame's `dt`.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for configs and data types

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod cancel;
mod error;
mod flow;
mod hand;
mod readiness;
mod sampler;
mod source;
mod time;
mod trajectory;

pub use cancel::CancelToken;
pub use error::{Result, TrackingError};
pub use flow::{
    DEFAULT_COUNTDOWN, DEFAULT_RECORD_WINDOW, FlowEvent, FlowState, RecordingFlow,
    RecordingFlowConfig,
};
pub use hand::{Finger, HandPose, Handedness};
pub use readiness::{DEFAULT_BACKOFF, ReadinessPoll, ReadinessState};
pub use sampler::{
    DEFAULT_FINAL_POINT_THRESHOLD, DEFAULT_MIN_DISTANCE, DEFAULT_SAMPLE_INTERVAL,
    PATIENT_MIN_DISTANCE, SampleOutcome, Sampler, SamplerConfig,
};
pub use source::{FixedPosition, PositionSource, ScriptedPath};
pub use time::{SessionClock, Timestamp};
pub use trajectory::RawTrajectory;
