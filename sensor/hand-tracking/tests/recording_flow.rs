//! End-to-end therapist recording: flow timing drives the sampler.

#![allow(clippy::unwrap_used)]

use hand_tracking::{
    FlowEvent, FlowState, PositionSource, RecordingFlow, RecordingFlowConfig, SampleOutcome,
    Sampler, SamplerConfig, SessionClock,
};
use nalgebra::Point3;
use trajectory_curve::ArcLengthResampler;

/// Brush sweeping a half circle of radius 0.25 m over the record window.
struct Brush {
    clock: SessionClock,
}

impl Brush {
    fn at(secs: f64) -> Point3<f64> {
        let a = (secs / 5.0).clamp(0.0, 1.0) * std::f64::consts::PI;
        Point3::new(0.25 * a.cos(), 0.8, 0.25 * a.sin())
    }
}

impl PositionSource for Brush {
    fn position(&mut self) -> Option<Point3<f64>> {
        Some(Self::at(self.clock.now().as_secs_f64()))
    }
}

#[test]
fn test_timed_recording_produces_spaced_points() {
    let dt = 1.0 / 72.0;
    let mut flow = RecordingFlow::new(RecordingFlowConfig::default());
    let mut sampler = Sampler::new(SamplerConfig::default());
    let mut brush = Brush {
        clock: SessionClock::new(),
    };
    let mut recorded = None;

    flow.begin();
    assert!(flow.on_grab());

    for _ in 0..(72 * 10) {
        match flow.tick(dt) {
            FlowEvent::StartSampling => {
                brush.clock.reset();
                sampler.start(Brush::at(0.0)).unwrap();
            }
            FlowEvent::StopSampling => {
                let last = brush.position();
                recorded = Some(sampler.stop(last).unwrap());
            }
            FlowEvent::None | FlowEvent::DiscardSampling => {}
        }
        if sampler.is_recording() {
            brush.clock.advance(dt);
            let outcome = sampler.tick(dt, &mut brush);
            assert_ne!(outcome, SampleOutcome::Unavailable);
        }
    }

    assert_eq!(flow.state(), FlowState::Post);
    let recorded = recorded.unwrap();

    // Half circumference is ~0.785 m; 0.01 m spacing caps the count
    assert!(recorded.len() > 50, "only {} points", recorded.len());
    assert!(recorded.len() <= 80, "{} points", recorded.len());
    for pair in recorded.points().windows(2) {
        assert!((pair[1] - pair[0]).norm() >= 0.001);
    }
    assert!((recorded.arc_length() - 0.785).abs() < 0.02);

    let knots = ArcLengthResampler::default()
        .resample(recorded.points())
        .unwrap();
    assert_eq!(knots.len(), 15);
}

#[test]
fn test_retry_discards_running_recording() {
    let mut flow = RecordingFlow::new(RecordingFlowConfig::default().with_countdown(0.5));
    let mut sampler = Sampler::new(SamplerConfig::default());

    flow.begin();
    flow.on_grab();
    assert_eq!(flow.tick(0.5), FlowEvent::StartSampling);
    sampler.start(Point3::origin()).unwrap();

    if flow.retry() == FlowEvent::DiscardSampling {
        sampler.cancel();
    }
    assert!(!sampler.is_recording());
    assert!(sampler.trajectory().is_empty());
    assert_eq!(flow.state(), FlowState::Waiting);
}
