//! Therapist trajectory capture.
//!
//! [`TrajectoryRecorder`] wires the [`RecordingFlow`] timing to a
//! [`Sampler`]: the countdown starts sampling, the end of the record window
//! stops it, retry and cancel discard it. A countdown that ends while the
//! tracker has no valid position waits on a [`ReadinessPoll`], so the source
//! is read once per backoff interval until it reports a position.

use hand_tracking::{
    CancelToken, DEFAULT_BACKOFF, FlowEvent, FlowState, PositionSource, RawTrajectory,
    ReadinessPoll, ReadinessState, RecordingFlow, RecordingFlowConfig, SampleOutcome, Sampler,
    SamplerConfig,
};
use tracing::{debug, warn};

/// What one [`TrajectoryRecorder::tick`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingStep {
    /// Not recording.
    Idle,
    /// Counting down; whole seconds left.
    Countdown(u32),
    /// Sampling is due but no position is available yet.
    WaitingForTracking,
    /// Sampling ran this tick.
    Sampled(SampleOutcome),
    /// The record window closed with this trajectory.
    Finished(RawTrajectory),
    /// The record window closed without tracking ever becoming valid.
    NoData,
    /// The cancel token fired; the attempt was dropped and the flow is idle.
    Cancelled,
}

/// Timed recording of a guide trajectory.
#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    flow: RecordingFlow,
    sampler: Sampler,
    backoff: f64,
    pending: Option<ReadinessPoll>,
    token: CancelToken,
}

impl TrajectoryRecorder {
    /// An idle recorder.
    #[must_use]
    pub fn new(flow: RecordingFlowConfig, sampler: SamplerConfig) -> Self {
        Self {
            flow: RecordingFlow::new(flow),
            sampler: Sampler::new(sampler),
            backoff: DEFAULT_BACKOFF,
            pending: None,
            token: CancelToken::new(),
        }
    }

    /// Set the delay between tracking checks while waiting to start.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    /// Flow state.
    #[must_use]
    pub const fn state(&self) -> FlowState {
        self.flow.state()
    }

    /// True while the sampler is running.
    #[must_use]
    pub fn is_sampling(&self) -> bool {
        self.sampler.is_recording()
    }

    /// Stop signal of the current attempt. Cancelling it drops the attempt
    /// on the next tick.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Arm the recorder and wait for the brush grab.
    pub fn begin(&mut self) {
        let event = self.flow.begin();
        self.apply_discard(event);
    }

    /// The brush was grabbed; starts the countdown when waiting.
    pub fn on_grab(&mut self) -> bool {
        let started = self.flow.on_grab();
        if started {
            self.token = CancelToken::new();
        }
        started
    }

    /// Advance by `dt`, sampling `source` when recording.
    pub fn tick<S: PositionSource + ?Sized>(&mut self, dt: f64, source: &mut S) -> RecordingStep {
        match self.flow.tick(dt) {
            FlowEvent::StartSampling => {
                self.pending =
                    Some(ReadinessPoll::new(self.backoff).with_cancel(self.token.clone()));
            }
            FlowEvent::StopSampling => {
                self.pending = None;
                return match self.sampler.stop(source.position()) {
                    Ok(trajectory) => RecordingStep::Finished(trajectory),
                    Err(e) => {
                        warn!(error = %e, "record window closed without tracking data");
                        RecordingStep::NoData
                    }
                };
            }
            FlowEvent::DiscardSampling => self.sampler.cancel(),
            FlowEvent::None => {}
        }

        if let Some(poll) = self.pending.as_mut() {
            let ready = poll.poll(dt, || {
                source
                    .position()
                    .filter(|p| p.coords.iter().all(|c| c.is_finite()))
            });
            return match ready {
                ReadinessState::Waiting => RecordingStep::WaitingForTracking,
                ReadinessState::Cancelled => self.abort(),
                ReadinessState::Ready(first) => match self.sampler.start(first) {
                    Ok(_) => {
                        self.pending = None;
                        RecordingStep::Sampled(SampleOutcome::Stored)
                    }
                    Err(e) => {
                        debug!(error = %e, "sampler not started");
                        RecordingStep::WaitingForTracking
                    }
                },
            };
        }

        match self.flow.state() {
            FlowState::Countdown | FlowState::Recording if self.token.is_cancelled() => {
                self.abort()
            }
            FlowState::Countdown => RecordingStep::Countdown(self.flow.remaining()),
            FlowState::Recording => RecordingStep::Sampled(self.sampler.tick(dt, source)),
            FlowState::Idle | FlowState::Waiting | FlowState::Post => RecordingStep::Idle,
        }
    }

    /// Drop the attempt and wait for a new grab.
    pub fn retry(&mut self) {
        let event = self.flow.retry();
        self.apply_discard(event);
    }

    /// Drop the attempt and go idle.
    pub fn cancel(&mut self) {
        let event = self.flow.cancel();
        self.apply_discard(event);
    }

    /// The finished recording was kept; back to idle.
    pub fn finish(&mut self) {
        self.flow.finish();
    }

    fn abort(&mut self) -> RecordingStep {
        debug!("recording attempt cancelled by token");
        self.pending = None;
        self.sampler.cancel();
        self.flow.cancel();
        RecordingStep::Cancelled
    }

    fn apply_discard(&mut self, event: FlowEvent) {
        self.pending = None;
        if event == FlowEvent::DiscardSampling {
            debug!("recording attempt discarded");
            self.token.cancel();
            self.sampler.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_tracking::ScriptedPath;
    use nalgebra::Point3;

    /// A source that never has a position and counts how often it was read.
    #[derive(Default)]
    struct LostTracking {
        reads: usize,
    }

    impl PositionSource for LostTracking {
        fn position(&mut self) -> Option<Point3<f64>> {
            self.reads += 1;
            None
        }
    }

    fn recorder() -> TrajectoryRecorder {
        TrajectoryRecorder::new(
            RecordingFlowConfig::default()
                .with_countdown(0.5)
                .with_record_window(1.0),
            SamplerConfig::default().with_interval(0.1),
        )
    }

    fn sweep(n: usize) -> ScriptedPath {
        ScriptedPath::from_points((0..n).map(|i| Point3::new(i as f64 * 0.02, 0.0, 0.0)))
    }

    #[test]
    fn test_full_cycle() {
        let mut rec = recorder();
        let mut source = sweep(200);
        assert_eq!(rec.tick(0.1, &mut source), RecordingStep::Idle);

        rec.begin();
        assert!(rec.on_grab());
        assert_eq!(rec.tick(0.1, &mut source), RecordingStep::Countdown(1));

        let mut finished = None;
        for _ in 0..40 {
            if let RecordingStep::Finished(t) = rec.tick(0.05, &mut source) {
                finished = Some(t);
                break;
            }
        }
        let trajectory = finished.unwrap_or_default();
        assert!(trajectory.len() >= 5, "{} points", trajectory.len());
        assert_eq!(rec.state(), FlowState::Post);
        rec.finish();
        assert_eq!(rec.state(), FlowState::Idle);
    }

    #[test]
    fn test_waits_for_tracking_before_start() {
        let mut rec = recorder();
        let mut source = ScriptedPath::new(vec![None, None, Some(Point3::origin())]);
        rec.begin();
        rec.on_grab();

        // Countdown ends on this tick but the first frame is not valid
        assert_eq!(rec.tick(0.5, &mut source), RecordingStep::WaitingForTracking);
        // Backing off: the source is not read again yet
        assert_eq!(rec.tick(0.125, &mut source), RecordingStep::WaitingForTracking);
        assert_eq!(rec.tick(0.125, &mut source), RecordingStep::WaitingForTracking);
        assert_eq!(
            rec.tick(0.25, &mut source),
            RecordingStep::Sampled(SampleOutcome::Stored)
        );
        assert!(rec.is_sampling());
    }

    #[test]
    fn test_tracking_checked_once_per_backoff() {
        let mut rec = TrajectoryRecorder::new(
            RecordingFlowConfig::default().with_countdown(0.5),
            SamplerConfig::default(),
        );
        let mut source = LostTracking::default();
        rec.begin();
        rec.on_grab();

        assert_eq!(rec.tick(0.5, &mut source), RecordingStep::WaitingForTracking);
        assert_eq!(source.reads, 1);
        for _ in 0..64 {
            assert_eq!(
                rec.tick(1.0 / 64.0, &mut source),
                RecordingStep::WaitingForTracking
            );
        }
        // One second at the default 0.25 s backoff
        assert_eq!(source.reads, 5);
    }

    #[test]
    fn test_cancel_token_stops_waiting() {
        let mut rec = recorder();
        let mut source = LostTracking::default();
        rec.begin();
        rec.on_grab();
        assert_eq!(rec.tick(0.5, &mut source), RecordingStep::WaitingForTracking);

        rec.cancel_token().cancel();
        assert_eq!(rec.tick(0.25, &mut source), RecordingStep::Cancelled);
        assert_eq!(rec.state(), FlowState::Idle);
        assert!(!rec.is_sampling());
        assert_eq!(rec.tick(0.25, &mut source), RecordingStep::Idle);
    }

    #[test]
    fn test_cancel_token_stops_sampling() {
        let mut rec = recorder();
        let mut source = sweep(200);
        rec.begin();
        rec.on_grab();
        rec.tick(0.5, &mut source);
        assert!(rec.is_sampling());

        rec.cancel_token().cancel();
        assert_eq!(rec.tick(0.1, &mut source), RecordingStep::Cancelled);
        assert!(!rec.is_sampling());

        // A new grab gets a fresh token
        rec.begin();
        assert!(rec.on_grab());
        assert!(!rec.cancel_token().is_cancelled());
    }

    #[test]
    fn test_window_without_tracking_reports_no_data() {
        let mut rec = recorder();
        let mut source = LostTracking::default();
        rec.begin();
        rec.on_grab();

        let mut last = RecordingStep::Idle;
        for _ in 0..40 {
            last = rec.tick(0.05, &mut source);
            if last == RecordingStep::NoData {
                break;
            }
            assert!(!matches!(last, RecordingStep::Finished(_)));
        }
        assert_eq!(last, RecordingStep::NoData);
        assert_eq!(rec.state(), FlowState::Post);
    }

    #[test]
    fn test_retry_discards() {
        let mut rec = recorder();
        let mut source = sweep(200);
        rec.begin();
        rec.on_grab();
        rec.tick(0.5, &mut source);
        assert!(rec.is_sampling());

        rec.retry();
        assert!(!rec.is_sampling());
        assert_eq!(rec.state(), FlowState::Waiting);
        assert_eq!(rec.tick(0.1, &mut source), RecordingStep::Idle);
    }
}
