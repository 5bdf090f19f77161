//! Scripted patient runs.

use hand_tracking::Handedness;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rehab_session::{RehabCore, SessionMetrics};
use serde::Serialize;
use tracing::debug;
use trajectory_curve::Curve;
use tube_feedback::{RecordingActuator, Zone};

/// How the scripted patient moves.
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Constant displacement from the guide.
    pub offset: Vector3<f64>,
    /// Uniform jitter amplitude per axis, metres.
    pub noise: f64,
    /// Frame rate.
    pub hz: f64,
    /// Seconds to traverse the guide once.
    pub duration: f64,
    /// Jitter seed.
    pub seed: u64,
    /// Holding hand.
    pub hand: Handedness,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            offset: Vector3::zeros(),
            noise: 0.0,
            hz: 60.0,
            duration: 5.0,
            seed: 0,
            hand: Handedness::Right,
        }
    }
}

/// What a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Frozen session metrics.
    pub metrics: SessionMetrics,
    /// Frames fed to the core.
    pub frames: usize,
    /// Zone transitions seen.
    pub zone_changes: usize,
    /// Radius growth steps taken.
    pub growth_steps: u32,
    /// Points in the recorded patient path.
    pub path_points: usize,
    /// Actuator `enter` calls.
    pub haptic_enters: usize,
    /// Actuator `exit` calls.
    pub haptic_exits: usize,
}

/// Positions of a patient following `curve` once at `options.hz`.
pub fn patient_frames<C: Curve + ?Sized>(curve: &C, options: &ReplayOptions) -> Vec<Point3<f64>> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (options.duration * options.hz).round().max(2.0) as usize;
    let mut rng = StdRng::seed_from_u64(options.seed);
    let noise = options.noise.abs();

    (0..count)
        .map(|i| {
            let t = i as f64 / (count - 1) as f64;
            let mut jitter = Vector3::zeros();
            if noise > 0.0 {
                jitter = Vector3::new(
                    rng.gen_range(-noise..=noise),
                    rng.gen_range(-noise..=noise),
                    rng.gen_range(-noise..=noise),
                );
            }
            curve.point_at(t) + options.offset + jitter
        })
        .collect()
}

/// Grab with `options.hand`, feed `frames` and score the session.
pub fn run(core: &mut RehabCore, frames: &[Point3<f64>], options: &ReplayOptions) -> ReplayReport {
    let dt = 1.0 / options.hz;
    let mut actuator = RecordingActuator::new();
    let mut zone = Zone::Inside;
    let mut zone_changes = 0;

    core.on_contact(options.hand);
    for (frame, position) in frames.iter().enumerate() {
        let update = core.update_tracking(Some(*position), dt, &mut actuator);
        if update.active && update.zone != zone {
            debug!(frame, from = ?zone, to = ?update.zone, distance = update.distance, "zone change");
            zone = update.zone;
            zone_changes += 1;
        }
    }

    let metrics = core.compute_session_score();
    ReplayReport {
        metrics,
        frames: frames.len(),
        zone_changes,
        growth_steps: core.tracker().stats().growth_steps,
        path_points: core.patient_path().len(),
        haptic_enters: actuator.enter_count(),
        haptic_exits: actuator.exit_count(),
    }
}
