//! Full station cycle against the JSON directory store: the therapist
//! records and saves a trajectory, the patient loads it, plays, and the
//! session is scored and persisted.

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use hand_tracking::{Handedness, ScriptedPath};
use nalgebra::Point3;
use rehab_session::{
    DocumentStore, JsonDirStore, LoadState, PersistOutcome, RecordingStep, RehabConfig, RehabCore,
    SessionContext,
};
use tube_feedback::RecordingActuator;

const DT: f64 = 1.0 / 60.0;

/// Half circle of radius 0.3 m at table height, sampled at `n` points.
fn half_circle(n: usize) -> Vec<Point3<f64>> {
    (0..n)
        .map(|i| {
            let a = std::f64::consts::PI * i as f64 / (n - 1) as f64;
            Point3::new(0.3 * a.cos(), 0.9, 0.3 * a.sin())
        })
        .collect()
}

fn record_guide(core: &mut RehabCore) -> Vec<Point3<f64>> {
    // The brush is only read once the countdown is over; the sweep spans
    // the 5 s window at 60 Hz
    let mut brush = ScriptedPath::from_points(half_circle(300));
    let recorder = core.recorder();
    recorder.begin();
    assert!(recorder.on_grab());

    for _ in 0..600 {
        if let RecordingStep::Finished(trajectory) = recorder.tick(DT, &mut brush) {
            recorder.finish();
            return trajectory.into_points();
        }
    }
    panic!("recording never finished");
}

#[test]
fn test_record_play_score_persist() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonDirStore::open(dir.path()).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 2, 3, 10, 30, 0).unwrap();

    // Therapist
    let mut therapist = RehabCore::new(RehabConfig::default()).unwrap();
    let points = record_guide(&mut therapist);
    assert!(points.len() > 50, "{} points", points.len());
    let trajectory = hand_tracking::RawTrajectory::from_points(points);
    let trajectory_id = therapist
        .save_trajectory(&mut store, "px01", &trajectory, 0.04, now)
        .unwrap();
    assert_eq!(trajectory_id, "Trajectory001-030225");
    assert!(
        dir.path()
            .join("px01/trajectories/Trajectory001-030225.json")
            .exists()
    );

    // Patient
    let mut core = RehabCore::new(RehabConfig::default()).unwrap();
    assert_eq!(
        core.load_trajectory(&store, "px01", Some(&trajectory_id)),
        LoadState::Ready
    );
    assert_relative_eq!(core.tube().unwrap().radius(), 0.04);
    assert_eq!(core.tube().unwrap().curve().knots().len(), 15);

    let mut actuator = RecordingActuator::new();
    assert!(core.on_contact(Handedness::Left));

    // Follow the arc for 2 s, then wander 20 cm above it for 1 s
    for p in half_circle(120) {
        core.update_tracking(Some(p), DT, &mut actuator);
    }
    for i in 0..60 {
        let a = std::f64::consts::PI * (1.0 - f64::from(i) / 60.0);
        let p = Point3::new(0.3 * a.cos(), 1.1, 0.3 * a.sin());
        core.update_tracking(Some(p), DT, &mut actuator);
    }
    assert!(actuator.enter_count() > 0);
    assert!(!core.patient_path().is_empty());

    let ctx = SessionContext::next_session(&store, "px01", &trajectory_id, now.date_naive()).unwrap();
    assert_eq!(ctx.session_id, "Session001-030225");

    assert!(core.complete_session(&ctx, &mut store, now).is_saved());
    assert!(matches!(
        core.complete_session(&ctx, &mut store, now),
        PersistOutcome::AlreadyCompleted
    ));

    let metrics = *core.metrics().unwrap();
    assert_eq!(metrics.total_errors, 1);
    assert_relative_eq!(metrics.total_time, 3.0, epsilon = 1e-6);
    assert_relative_eq!(metrics.time_outside, 1.0, epsilon = 1e-6);
    assert_relative_eq!(metrics.inside_percentage, 200.0 / 3.0, epsilon = 1e-4);
    // 2/3 inside with one exit: past t_min and the error threshold, short of t_min + 20
    assert_eq!(metrics.stars, 3);

    // Everything survives a reopen
    let reopened = JsonDirStore::open(dir.path()).unwrap();
    let saved = reopened
        .read_session("px01", &ctx.session_id)
        .unwrap()
        .unwrap();
    assert_eq!(saved.hand, "left");
    assert_eq!(saved.trajectory_id, trajectory_id);
    assert_eq!(saved.metrics.stars, 3);
    assert_eq!(reopened.completed_sessions("px01").unwrap(), 1);
    assert_eq!(reopened.completed_trajectories("px01").unwrap(), 1);

    let next = SessionContext::next_session(&reopened, "px01", &trajectory_id, now.date_naive())
        .unwrap();
    assert_eq!(next.session_id, "Session002-030225");
}

#[test]
fn test_missing_trajectory_keeps_previous_tube() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::open(dir.path()).unwrap();
    let mut core = RehabCore::new(RehabConfig::default()).unwrap();
    let curve = core.build_curve(&half_circle(40)).unwrap();
    core.install_curve(curve, 0.05).unwrap();

    assert_eq!(
        core.load_trajectory(&store, "px01", Some("Trajectory009-010125")),
        LoadState::Failed
    );
    assert!(core.tube().is_some());
    assert_eq!(core.load_trajectory(&store, "px01", None), LoadState::NoData);
}
