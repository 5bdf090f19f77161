//! Fixed-cadence trajectory sampling.
//!
//! The sampler turns a continuously updated tracked position into an ordered
//! point list. It is driven by the frame loop but samples on its own
//! wall-clock interval: frames shorter than the interval accumulate, and a
//! sample is taken on the first frame at or past it.

use crate::cancel::CancelToken;
use crate::error::{Result, TrackingError};
use crate::source::PositionSource;
use crate::trajectory::RawTrajectory;
use nalgebra::Point3;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default sampling interval (60 Hz).
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 1.0 / 60.0;

/// Default minimum spacing for therapist recordings, in metres.
pub const DEFAULT_MIN_DISTANCE: f64 = 0.01;

/// Minimum spacing used when recording the patient's own path.
pub const PATIENT_MIN_DISTANCE: f64 = 0.005;

/// The final position is appended on stop when farther than this.
pub const DEFAULT_FINAL_POINT_THRESHOLD: f64 = 0.001;

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Seconds between samples.
    pub interval: f64,
    /// A sample is stored only if at least this far from the last stored point.
    pub min_distance: f64,
    /// Minimum gap for appending the final position on stop.
    pub final_point_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SAMPLE_INTERVAL,
            min_distance: DEFAULT_MIN_DISTANCE,
            final_point_threshold: DEFAULT_FINAL_POINT_THRESHOLD,
        }
    }
}

impl SamplerConfig {
    /// Settings for recording a patient's path.
    #[must_use]
    pub fn patient() -> Self {
        Self::default().with_min_distance(PATIENT_MIN_DISTANCE)
    }

    /// Set the sampling interval in seconds.
    #[must_use]
    pub const fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    /// Set the minimum spacing between stored points.
    #[must_use]
    pub const fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Set the final-point append threshold.
    #[must_use]
    pub const fn with_final_point_threshold(mut self, threshold: f64) -> Self {
        self.final_point_threshold = threshold;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::InvalidConfig`] for a non-positive interval
    /// or negative / non-finite distances.
    pub fn validate(&self) -> Result<()> {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(TrackingError::invalid_config(
                "interval",
                format!("must be positive, got {}", self.interval),
            ));
        }
        if !(self.min_distance.is_finite() && self.min_distance >= 0.0) {
            return Err(TrackingError::invalid_config(
                "min_distance",
                format!("must be non-negative, got {}", self.min_distance),
            ));
        }
        if !(self.final_point_threshold.is_finite() && self.final_point_threshold >= 0.0) {
            return Err(TrackingError::invalid_config(
                "final_point_threshold",
                format!("must be non-negative, got {}", self.final_point_threshold),
            ));
        }
        Ok(())
    }
}

/// What a single [`Sampler::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Not recording (never started, stopped or cancelled).
    Idle,
    /// The sampling interval has not elapsed yet.
    NotDue,
    /// A new point was stored.
    Stored,
    /// The position was too close to the last stored point.
    TooClose,
    /// No valid position this tick.
    Unavailable,
}

/// Records positions at a fixed cadence with minimum spacing.
///
/// # Example
///
/// ```
/// use hand_tracking::{FixedPosition, SampleOutcome, Sampler, SamplerConfig};
/// use nalgebra::Point3;
///
/// let mut sampler = Sampler::new(SamplerConfig::default());
/// sampler.start(Point3::origin()).unwrap();
///
/// let mut hand = FixedPosition(Point3::new(0.02, 0.0, 0.0));
/// assert_eq!(sampler.tick(1.0 / 60.0, &mut hand), SampleOutcome::Stored);
///
/// let recording = sampler.stop(None).unwrap();
/// assert_eq!(recording.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SamplerConfig,
    trajectory: RawTrajectory,
    recording: bool,
    since_sample: f64,
    token: CancelToken,
}

impl Sampler {
    /// Create an idle sampler.
    #[must_use]
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            trajectory: RawTrajectory::new(),
            recording: false,
            since_sample: 0.0,
            token: CancelToken::new(),
        }
    }

    /// Sampling parameters.
    #[must_use]
    pub const fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// True while a recording is running.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording && !self.token.is_cancelled()
    }

    /// Points stored so far.
    #[must_use]
    pub const fn trajectory(&self) -> &RawTrajectory {
        &self.trajectory
    }

    /// Handle that stops this recording when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Start a new recording seeded with `first`.
    ///
    /// Any previous points are discarded. The first tick after starting
    /// takes a sample.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NonFinitePosition`] if `first` has a NaN or
    /// infinite coordinate.
    pub fn start(&mut self, first: Point3<f64>) -> Result<CancelToken> {
        if !first.coords.iter().all(|c| c.is_finite()) {
            return Err(TrackingError::NonFinitePosition {
                x: first.x,
                y: first.y,
                z: first.z,
            });
        }

        self.trajectory.clear();
        self.trajectory.push(first);
        self.recording = true;
        self.since_sample = self.config.interval;
        self.token = CancelToken::new();

        info!(
            interval = self.config.interval,
            min_distance = self.config.min_distance,
            "trajectory recording started"
        );
        Ok(self.token.clone())
    }

    /// Advance by `dt` seconds, sampling `source` if the interval elapsed.
    pub fn tick<S: PositionSource + ?Sized>(&mut self, dt: f64, source: &mut S) -> SampleOutcome {
        if !self.recording {
            return SampleOutcome::Idle;
        }
        if self.token.is_cancelled() {
            self.recording = false;
            debug!("sampler observed cancellation");
            return SampleOutcome::Idle;
        }

        if dt.is_finite() && dt > 0.0 {
            self.since_sample += dt;
        }
        if self.since_sample < self.config.interval {
            return SampleOutcome::NotDue;
        }
        self.since_sample = 0.0;

        let Some(pos) = source.position() else {
            return SampleOutcome::Unavailable;
        };
        if !pos.coords.iter().all(|c| c.is_finite()) {
            return SampleOutcome::Unavailable;
        }

        let far_enough = self
            .trajectory
            .last()
            .is_none_or(|last| (pos - last).norm() >= self.config.min_distance);

        if far_enough {
            self.trajectory.push(pos);
            SampleOutcome::Stored
        } else {
            SampleOutcome::TooClose
        }
    }

    /// Finish the recording and hand out the points.
    ///
    /// `final_position`, when given and farther than the final-point
    /// threshold from the last stored point, is appended first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotRecording`] if no recording is running
    /// (never started, already stopped or cancelled).
    pub fn stop(&mut self, final_position: Option<Point3<f64>>) -> Result<RawTrajectory> {
        if !self.is_recording() {
            self.recording = false;
            return Err(TrackingError::NotRecording);
        }
        self.recording = false;

        if let Some(pos) = final_position.filter(|p| p.coords.iter().all(|c| c.is_finite())) {
            let gap = self
                .trajectory
                .last()
                .map_or(f64::INFINITY, |last| (pos - last).norm());
            if gap > self.config.final_point_threshold {
                self.trajectory.push(pos);
            }
        }

        let recorded = std::mem::take(&mut self.trajectory);
        info!(
            points = recorded.len(),
            length = recorded.arc_length(),
            "trajectory recording stopped"
        );
        Ok(recorded)
    }

    /// Abort the recording and discard its points.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.recording = false;
        self.trajectory.clear();
        debug!("trajectory recording cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FixedPosition, ScriptedPath};

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_config_validation() {
        assert!(SamplerConfig::default().validate().is_ok());
        assert!(SamplerConfig::default().with_interval(0.0).validate().is_err());
        assert!(SamplerConfig::default().with_min_distance(-0.1).validate().is_err());
        assert!(
            SamplerConfig::default()
                .with_final_point_threshold(f64::NAN)
                .validate()
                .is_err()
        );
        assert!((SamplerConfig::patient().min_distance - PATIENT_MIN_DISTANCE).abs() < 1e-15);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_first_point_seeded() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.start(Point3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(sampler.trajectory().len(), 1);
        assert!(sampler.is_recording());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_min_distance_filter() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.start(Point3::origin()).unwrap();

        let mut path = ScriptedPath::from_points([
            Point3::new(0.005, 0.0, 0.0), // too close
            Point3::new(0.01, 0.0, 0.0),  // exactly at the threshold
            Point3::new(0.015, 0.0, 0.0), // too close to the previous
            Point3::new(0.05, 0.0, 0.0),
        ]);

        let outcomes: Vec<_> = (0..4).map(|_| sampler.tick(DT, &mut path)).collect();
        assert_eq!(
            outcomes,
            vec![
                SampleOutcome::TooClose,
                SampleOutcome::Stored,
                SampleOutcome::TooClose,
                SampleOutcome::Stored,
            ]
        );
        assert_eq!(sampler.trajectory().len(), 3);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_interval_accumulates_short_frames() {
        let mut sampler = Sampler::new(SamplerConfig::default().with_interval(0.1));
        sampler.start(Point3::origin()).unwrap();
        let mut hand = FixedPosition(Point3::new(1.0, 0.0, 0.0));

        // First tick samples immediately
        assert_eq!(sampler.tick(0.01, &mut hand), SampleOutcome::Stored);

        hand.0 = Point3::new(2.0, 0.0, 0.0);
        for _ in 0..9 {
            assert_eq!(sampler.tick(0.01, &mut hand), SampleOutcome::NotDue);
        }
        assert_eq!(sampler.tick(0.011, &mut hand), SampleOutcome::Stored);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_unavailable_stores_nothing() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.start(Point3::origin()).unwrap();
        let mut lost = || -> Option<Point3<f64>> { None };
        assert_eq!(sampler.tick(DT, &mut lost), SampleOutcome::Unavailable);
        let mut nan = FixedPosition(Point3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(sampler.tick(DT, &mut nan), SampleOutcome::Unavailable);
        assert_eq!(sampler.trajectory().len(), 1);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_stop_appends_final_point() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.start(Point3::origin()).unwrap();
        let recorded = sampler.stop(Some(Point3::new(0.002, 0.0, 0.0))).unwrap();
        assert_eq!(recorded.len(), 2);

        sampler.start(Point3::origin()).unwrap();
        let recorded = sampler.stop(Some(Point3::new(0.0005, 0.0, 0.0))).unwrap();
        assert_eq!(recorded.len(), 1);

        assert_eq!(sampler.stop(None).unwrap_err(), TrackingError::NotRecording);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_cancel_token_blocks_mutation() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        let token = sampler.start(Point3::origin()).unwrap();
        let mut hand = FixedPosition(Point3::new(1.0, 0.0, 0.0));

        token.cancel();
        assert!(!sampler.is_recording());
        assert_eq!(sampler.tick(DT, &mut hand), SampleOutcome::Idle);
        assert_eq!(sampler.trajectory().len(), 1);
        assert!(sampler.stop(Some(Point3::new(5.0, 0.0, 0.0))).is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_cancel_discards_and_restart_works() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.start(Point3::origin()).unwrap();
        sampler.cancel();
        assert!(sampler.trajectory().is_empty());

        sampler.start(Point3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(sampler.is_recording());
        assert_eq!(sampler.trajectory().len(), 1);
    }

    #[test]
    fn test_start_rejects_nan() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        let err = sampler.start(Point3::new(0.0, f64::INFINITY, 0.0)).unwrap_err();
        assert!(matches!(err, TrackingError::NonFinitePosition { .. }));
        assert!(!sampler.is_recording());
    }
}
