//! The rehabilitation core.
//!
//! [`RehabCore`] owns every stateful component of one station and exposes
//! the operations the application layer calls: record a trajectory, build
//! and install its curve, track the held object each frame, score the
//! session and persist it.
//!
//! All calls happen on the caller's frame loop. Per-frame calls
//! ([`RehabCore::update_tracking`], [`RehabCore::update_fingertips`]) never
//! fail; unavailable inputs give neutral results.

use crate::config::RehabConfig;
use crate::context::SessionContext;
use crate::error::{Result, StoreError};
use crate::grab::{GrabState, GrabStateMachine};
use crate::ids::trajectory_id;
use crate::loader::{LoadState, TrajectoryLoader, build_curve};
use crate::recording::TrajectoryRecorder;
use crate::scorer::{SessionMetrics, SessionScorer};
use crate::store::{DocumentStore, SessionRecord, TrajectoryRecord};
use chrono::{DateTime, Utc};
use hand_tracking::{
    CancelToken, FixedPosition, HandPose, Handedness, PositionSource, RawTrajectory,
    SampleOutcome, Sampler, SessionClock,
};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};
use trajectory_curve::SmoothSpline;
use tube_feedback::{
    FingertipMonitor, HapticActuator, HapticChannel, HapticDispatcher, ToleranceTracker,
    ToleranceTube, TrackingUpdate,
};

/// Result of [`RehabCore::complete_session`].
#[derive(Debug)]
pub enum PersistOutcome {
    /// The session record was written.
    Saved,
    /// This session was already persisted; nothing was written.
    AlreadyCompleted,
    /// The store failed. Metrics are kept and the call can be retried.
    Failed(StoreError),
}

impl PersistOutcome {
    /// True for [`PersistOutcome::Saved`].
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

const fn side_index(side: Handedness) -> usize {
    match side {
        Handedness::Left => 0,
        Handedness::Right => 1,
    }
}

/// One rehabilitation station: recording, tracking, scoring, persistence.
#[derive(Debug)]
pub struct RehabCore {
    config: RehabConfig,
    recorder: TrajectoryRecorder,
    sampler: Sampler,
    path: Sampler,
    patient_path: RawTrajectory,
    tracker: ToleranceTracker,
    grab: GrabStateMachine,
    scorer: SessionScorer,
    loader: TrajectoryLoader,
    forearm: [HapticDispatcher; 2],
    fingertips: [FingertipMonitor; 2],
    clock: SessionClock,
    persisted: bool,
}

impl RehabCore {
    /// A core with no tube, nobody holding the object and a fresh session.
    ///
    /// # Errors
    ///
    /// Returns the first [`RehabConfig::validate`] error.
    pub fn new(config: RehabConfig) -> Result<Self> {
        config.validate()?;
        let refresh = config.haptics.refresh_interval;
        Ok(Self {
            recorder: TrajectoryRecorder::new(config.flow, config.sampler),
            sampler: Sampler::new(config.sampler),
            path: Sampler::new(config.patient_sampler),
            patient_path: RawTrajectory::new(),
            tracker: ToleranceTracker::new(config.tracking, config.haptics),
            grab: GrabStateMachine::new(),
            scorer: SessionScorer::new(config.scoring),
            loader: TrajectoryLoader::new(),
            forearm: Handedness::BOTH
                .map(|side| HapticDispatcher::new(HapticChannel::forearm(side), refresh)),
            fingertips: Handedness::BOTH.map(|side| FingertipMonitor::new(side, &config.haptics)),
            clock: SessionClock::new(),
            persisted: false,
            config,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RehabConfig {
        &self.config
    }

    /// The timed therapist recorder.
    pub fn recorder(&mut self) -> &mut TrajectoryRecorder {
        &mut self.recorder
    }

    /// The tolerance tracker.
    #[must_use]
    pub const fn tracker(&self) -> &ToleranceTracker {
        &self.tracker
    }

    /// The installed tube, if any.
    #[must_use]
    pub const fn tube(&self) -> Option<&ToleranceTube> {
        self.tracker.tube()
    }

    /// Grab state.
    #[must_use]
    pub const fn grab_state(&self) -> GrabState {
        self.grab.state()
    }

    /// Outcome of the last trajectory load.
    #[must_use]
    pub const fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    /// Session time, advanced by [`Self::update_tracking`].
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.clock.now().as_secs_f64()
    }

    /// Points of the held object's path recorded so far this session.
    #[must_use]
    pub fn patient_path(&self) -> &[Point3<f64>] {
        if self.path.is_recording() {
            self.path.trajectory().points()
        } else {
            self.patient_path.points()
        }
    }

    /// The frozen session metrics, once scored.
    #[must_use]
    pub const fn metrics(&self) -> Option<&SessionMetrics> {
        self.scorer.metrics()
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Start recording a guide trajectory seeded with `first`.
    pub fn start_recording(&mut self, first: Point3<f64>) -> Result<CancelToken> {
        Ok(self.sampler.start(first)?)
    }

    /// Advance the running recording.
    pub fn recording_tick<S: PositionSource + ?Sized>(
        &mut self,
        dt: f64,
        source: &mut S,
    ) -> SampleOutcome {
        self.sampler.tick(dt, source)
    }

    /// Stop the recording and return its points.
    pub fn stop_recording(&mut self, final_position: Option<Point3<f64>>) -> Result<RawTrajectory> {
        Ok(self.sampler.stop(final_position)?)
    }

    /// Abort the recording.
    pub fn cancel_recording(&mut self) {
        self.sampler.cancel();
    }

    /// Save a therapist trajectory under the patient's next trajectory id.
    ///
    /// The radius is clamped to the configured bounds and stored rounded to
    /// millimetres. Returns the new id.
    ///
    /// # Errors
    ///
    /// Fails with too few points or on any store error; nothing is counted
    /// unless the trajectory document was written.
    pub fn save_trajectory<S: DocumentStore + ?Sized>(
        &self,
        store: &mut S,
        patient_id: &str,
        trajectory: &RawTrajectory,
        radius: f64,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let radius = self.config.bounds.clamp(radius);
        let record = TrajectoryRecord::new(trajectory.points(), radius, now)?;
        let number = store.completed_trajectories(patient_id)?.saturating_add(1);
        let id = trajectory_id(number, now.date_naive());

        store.write_trajectory(patient_id, &id, &record)?;
        store.set_completed_trajectories(patient_id, number)?;
        info!(
            patient = patient_id,
            trajectory = %id,
            points = record.point_count,
            radius = ?record.radius,
            "trajectory saved"
        );
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Curve
    // ------------------------------------------------------------------

    /// Resample `points` to the configured knot count and fit the guide
    /// spline.
    pub fn build_curve(&self, points: &[Point3<f64>]) -> Result<SmoothSpline> {
        let curve = build_curve(points, self.config.knot_count)?;
        info!(
            points = points.len(),
            knots = curve.knots().len(),
            "guide curve built"
        );
        Ok(curve)
    }

    /// Swap in a new tube around `curve`, clamping `radius` to the bounds.
    ///
    /// The previous tube stays active until the new one is complete.
    pub fn install_curve(&mut self, curve: SmoothSpline, radius: f64) -> Result<()> {
        let tube = ToleranceTube::new(curve, radius, self.config.bounds)?;
        self.tracker.install_tube(tube);
        Ok(())
    }

    /// Swap in a ready-built tube, such as one from [`crate::tube_from_record`].
    pub fn install_tube(&mut self, tube: ToleranceTube) {
        self.tracker.install_tube(tube);
    }

    /// Load a stored trajectory and install its tube when it succeeds.
    pub fn load_trajectory<S: DocumentStore + ?Sized>(
        &mut self,
        store: &S,
        patient_id: &str,
        trajectory_id: Option<&str>,
    ) -> LoadState {
        if let Some(tube) = self
            .loader
            .load(store, patient_id, trajectory_id, &self.config)
        {
            self.tracker.install_tube(tube);
        }
        self.loader.state()
    }

    // ------------------------------------------------------------------
    // Play
    // ------------------------------------------------------------------

    /// A hand touched the object. Returns true if it became the holder.
    pub fn on_contact(&mut self, side: Handedness) -> bool {
        let assigned = self.grab.on_contact(side, self.clock.now());
        if assigned {
            self.fingertips[side_index(side)].activate();
        }
        assigned
    }

    /// One frame of tracking with the held object at `target`.
    ///
    /// Advances the session clock by `dt`. Tracking only runs while a hand
    /// holds the object and the session is not yet scored; otherwise the
    /// forearm channels are stopped and an idle update is returned.
    pub fn update_tracking<A: HapticActuator + ?Sized>(
        &mut self,
        target: Option<Point3<f64>>,
        dt: f64,
        actuator: &mut A,
    ) -> TrackingUpdate {
        self.clock.advance(dt);

        let Some(holder) = self.grab.holder().filter(|_| !self.scorer.is_complete()) else {
            self.stop_forearm(actuator);
            return TrackingUpdate::idle();
        };

        if let Some(position) = target {
            self.record_path(position, dt);
        }
        let update = self.tracker.update(target, dt);
        let vector = if update.active {
            update.direction
        } else {
            Vector3::zeros()
        };
        self.forearm[side_index(holder)].dispatch(dt, vector, actuator);
        update
    }

    /// Glove feedback for one tracked hand.
    ///
    /// Only the holding hand's glove is active; every other case returns
    /// no offsets.
    pub fn update_fingertips<A: HapticActuator + ?Sized>(
        &mut self,
        pose: &HandPose,
        dt: f64,
        actuator: &mut A,
    ) -> [Option<Vector3<f64>>; 5] {
        if self.scorer.is_complete() {
            return [None; 5];
        }
        let Some(tube) = self.tracker.tube() else {
            return [None; 5];
        };
        self.fingertips[side_index(pose.side)].update(
            pose,
            tube,
            self.tracker.config(),
            dt,
            actuator,
        )
    }

    /// Administrative release: drop the object and silence every channel.
    pub fn force_release<A: HapticActuator + ?Sized>(&mut self, actuator: &mut A) {
        self.grab.force_release(self.clock.now());
        self.stop_path();
        self.silence(actuator);
    }

    // ------------------------------------------------------------------
    // Scoring and persistence
    // ------------------------------------------------------------------

    /// Score the session. The first call freezes the metrics; later calls
    /// return them unchanged.
    ///
    /// Total time runs from the grab to the release, or to now while the
    /// object is still held; without a grab it is the tracked time.
    pub fn compute_session_score(&mut self) -> SessionMetrics {
        let stats = *self.tracker.stats();
        let end = self.grab.finished_at().unwrap_or_else(|| self.clock.now());
        let total_time = self
            .grab
            .started_at()
            .map_or(stats.elapsed, |start| end.secs_since(start));
        let radius = self
            .tracker
            .tube()
            .map_or(self.config.default_radius, ToleranceTube::radius);
        self.scorer
            .compute(stats.time_outside, total_time, stats.total_errors, radius)
    }

    /// Score (if needed) and persist the session once.
    ///
    /// On success the patient's completed-session counter is set to
    /// `ctx.session_number`. A failed counter update is logged but the
    /// session still counts as saved. A failed session write leaves the
    /// metrics untouched and can be retried.
    pub fn complete_session<S: DocumentStore + ?Sized>(
        &mut self,
        ctx: &SessionContext,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> PersistOutcome {
        let metrics = self.compute_session_score();
        self.stop_path();
        if self.persisted {
            return PersistOutcome::AlreadyCompleted;
        }

        let record = SessionRecord {
            completed_at: now,
            trajectory_id: ctx.trajectory_id.clone(),
            session_number: ctx.session_number,
            hand: self.grab.hand().map_or("none", Handedness::as_str).to_string(),
            metrics,
        };
        if let Err(e) = store.write_session(&ctx.patient_id, &ctx.session_id, &record) {
            warn!(
                patient = %ctx.patient_id,
                session = %ctx.session_id,
                error = %e,
                "session write failed"
            );
            return PersistOutcome::Failed(e);
        }
        self.persisted = true;

        if let Err(e) = store.set_completed_sessions(&ctx.patient_id, ctx.session_number) {
            warn!(patient = %ctx.patient_id, error = %e, "completed-session counter not updated");
        }
        info!(
            patient = %ctx.patient_id,
            session = %ctx.session_id,
            stars = metrics.stars,
            "session saved"
        );
        PersistOutcome::Saved
    }

    /// Start a new session on the same tube: clears grab, counters, score
    /// and clock, and silences every channel.
    pub fn reset_session<A: HapticActuator + ?Sized>(&mut self, actuator: &mut A) {
        self.silence(actuator);
        self.grab.reset();
        self.scorer.reset();
        self.tracker.reset_session();
        self.clock.reset();
        self.path.cancel();
        self.patient_path = RawTrajectory::new();
        self.persisted = false;
    }

    fn record_path(&mut self, position: Point3<f64>, dt: f64) {
        if self.path.is_recording() {
            self.path.tick(dt, &mut FixedPosition(position));
        } else if self.patient_path.is_empty() {
            // Started on the first valid frame after the grab
            if let Err(e) = self.path.start(position) {
                debug!(error = %e, "patient path not started");
            }
        }
    }

    fn stop_path(&mut self) {
        if self.path.is_recording() {
            if let Ok(path) = self.path.stop(None) {
                info!(points = path.len(), length = path.arc_length(), "patient path closed");
                self.patient_path = path;
            }
        }
    }

    fn stop_forearm<A: HapticActuator + ?Sized>(&mut self, actuator: &mut A) {
        for dispatcher in &mut self.forearm {
            dispatcher.stop(actuator);
        }
    }

    fn silence<A: HapticActuator + ?Sized>(&mut self, actuator: &mut A) {
        self.stop_forearm(actuator);
        for monitor in &mut self.fingertips {
            monitor.deactivate(actuator);
        }
    }
}
