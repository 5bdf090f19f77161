//! Loading a stored trajectory into a tolerance tube.

use crate::config::RehabConfig;
use crate::error::{Result, SessionError};
use crate::store::{DocumentStore, TrajectoryRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trajectory_curve::{ArcLengthResampler, SmoothSpline};
use tube_feedback::ToleranceTube;

/// Progress of a trajectory load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A load is in progress.
    Loading,
    /// The tube is built.
    Ready,
    /// No trajectory is selected for the patient.
    NoData,
    /// The record was missing, unreadable or too short.
    Failed,
}

/// Resample `points` to `knot_count` knots by arc length and fit the guide
/// spline through them.
///
/// # Errors
///
/// Returns an insufficient-points error for fewer than two points and a
/// curve error for non-finite coordinates.
pub fn build_curve(points: &[nalgebra::Point3<f64>], knot_count: usize) -> Result<SmoothSpline> {
    if points.len() < 2 {
        return Err(SessionError::insufficient_points(2, points.len()));
    }
    let knots = ArcLengthResampler::new(knot_count).resample(points)?;
    Ok(SmoothSpline::through_knots(&knots)?)
}

/// Turn a stored record into a tube: resample, fit, clamp the radius.
///
/// # Errors
///
/// See [`build_curve`].
pub fn tube_from_record(record: &TrajectoryRecord, config: &RehabConfig) -> Result<ToleranceTube> {
    let curve = build_curve(&record.positions(), config.knot_count)?;
    let radius = record
        .radius
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(config.default_radius);
    Ok(ToleranceTube::new(curve, config.bounds.clamp(radius), config.bounds)?)
}

/// Loads trajectories from a [`DocumentStore`] and tracks the outcome.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryLoader {
    state: LoadState,
    last_error: Option<String>,
}

impl TrajectoryLoader {
    /// An idle loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// Why the last load failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Load `trajectory_id` for `patient_id` and build its tube.
    ///
    /// An empty or missing id ends in [`LoadState::NoData`]; a missing
    /// document, store error or unusable record ends in
    /// [`LoadState::Failed`]. Only [`LoadState::Ready`] returns a tube.
    pub fn load<S: DocumentStore + ?Sized>(
        &mut self,
        store: &S,
        patient_id: &str,
        trajectory_id: Option<&str>,
        config: &RehabConfig,
    ) -> Option<ToleranceTube> {
        self.last_error = None;
        let Some(trajectory_id) = trajectory_id.filter(|id| !id.is_empty()) else {
            info!(patient = patient_id, "no trajectory selected");
            self.state = LoadState::NoData;
            return None;
        };

        self.state = LoadState::Loading;
        let record = match store.read_trajectory(patient_id, trajectory_id) {
            Ok(Some(record)) => record,
            Ok(None) => return self.fail(trajectory_id, "trajectory document does not exist"),
            Err(e) => return self.fail(trajectory_id, &e.to_string()),
        };

        match tube_from_record(&record, config) {
            Ok(tube) => {
                info!(
                    trajectory = trajectory_id,
                    points = record.points.len(),
                    knots = tube.curve().knots().len(),
                    radius = tube.radius(),
                    "trajectory loaded"
                );
                self.state = LoadState::Ready;
                Some(tube)
            }
            Err(e) => self.fail(trajectory_id, &e.to_string()),
        }
    }

    fn fail(&mut self, trajectory_id: &str, reason: &str) -> Option<ToleranceTube> {
        warn!(trajectory = trajectory_id, reason, "trajectory load failed");
        self.state = LoadState::Failed;
        self.last_error = Some(reason.to_string());
        None
    }
}
