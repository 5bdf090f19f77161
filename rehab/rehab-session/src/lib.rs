//! Session layer for tube-guided rehabilitation.
//!
//! Ties the lower crates together into one play session:
//!
//! - [`GrabStateMachine`] - Which hand holds the object; stamps the start
//! - [`SessionScorer`] - Inside percentage and the nested star ladder,
//!   computed once per session
//! - [`DocumentStore`] - Trajectory and session records, with
//!   [`MemoryStore`] and [`JsonDirStore`] implementations
//! - [`TrajectoryLoader`] - Stored record to installed tube
//! - [`TrajectoryRecorder`] - Countdown-timed therapist recording
//! - [`RehabCore`] - The facade the application drives every frame
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, Utc};
//! use hand_tracking::Handedness;
//! use nalgebra::Point3;
//! use rehab_session::{MemoryStore, RehabConfig, RehabCore, SessionContext};
//! use tube_feedback::RecordingActuator;
//!
//! let mut core = RehabCore::new(RehabConfig::default()).unwrap();
//! let guide: Vec<_> = (0..50).map(|i| Point3::new(i as f64 * 0.01, 0.9, 0.0)).collect();
//! let curve = core.build_curve(&guide).unwrap();
//! core.install_curve(curve, 0.05).unwrap();
//!
//! let mut actuator = RecordingActuator::new();
//! core.on_contact(Handedness::Right);
//! for i in 0..60 {
//!     let target = Point3::new(i as f64 * 0.008, 0.9, 0.0);
//!     core.update_tracking(Some(target), 1.0 / 60.0, &mut actuator);
//! }
//!
//! let mut store = MemoryStore::new();
//! let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
//! let ctx = SessionContext::next_session(&store, "px01", "Trajectory001-030225", date).unwrap();
//! assert!(core.complete_session(&ctx, &mut store, Utc::now()).is_saved());
//! assert_eq!(core.metrics().map(|m| m.stars), Some(5));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod error;
mod grab;
mod ids;
mod json_store;
mod loader;
mod memory;
mod recording;
mod scorer;
mod store;

pub use config::RehabConfig;
pub use context::SessionContext;
pub use engine::{PersistOutcome, RehabCore};
pub use error::{Result, SessionError, StoreError, StoreResult};
pub use grab::{GrabState, GrabStateMachine};
pub use ids::{is_valid_id, session_id, trajectory_id};
pub use json_store::JsonDirStore;
pub use loader::{LoadState, TrajectoryLoader, build_curve, tube_from_record};
pub use memory::MemoryStore;
pub use recording::{RecordingStep, TrajectoryRecorder};
pub use scorer::{
    DEFAULT_ERROR_THRESHOLD, DEFAULT_T_MIN, ERROR_STEP, ScoreThresholds, SessionMetrics,
    SessionScorer, T_MIN_STEP, inside_percentage,
};
pub use store::{DocumentStore, PatientRecord, PointRecord, SessionRecord, TrajectoryRecord};
