//! Headless replay for the tube-guided rehabilitation core.
//!
//! Loads a stored trajectory, fits its guide tube, then drives a scripted
//! patient along it through [`RehabCore`] and prints the session metrics as
//! JSON. Useful for tuning thresholds without a headset.
//!
//! # Usage
//!
//! ```text
//! rehab-replay --trajectory Trajectory001-030225.json
//! rehab-replay --config rehab.json --trajectory t.json --offset 0,0.04,0 --noise 0.01
//! rehab-replay --trajectory t.json --store ./sessions --patient px01
//! ```
//!
//! Set `RUST_LOG=debug` to see zone changes.

mod replay;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use hand_tracking::Handedness;
use nalgebra::Vector3;
use rehab_session::{
    JsonDirStore, PersistOutcome, RehabConfig, RehabCore, SessionContext, TrajectoryRecord,
    tube_from_record,
};
use replay::{ReplayOptions, patient_frames};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replay a patient path through the rehabilitation core
#[derive(Parser, Debug)]
#[command(name = "rehab-replay")]
#[command(about = "Replay a scripted patient along a stored trajectory", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trajectory record (JSON)
    #[arg(long)]
    trajectory: PathBuf,

    /// Constant offset from the guide, "dx,dy,dz" in metres
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    offset: Option<Vector3<f64>>,

    /// Uniform per-axis jitter amplitude in metres
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Jitter seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Frame rate
    #[arg(long, default_value_t = 60.0)]
    hz: f64,

    /// Seconds to traverse the guide
    #[arg(long, default_value_t = 5.0)]
    duration: f64,

    /// Hold with the left hand instead of the right
    #[arg(long)]
    left: bool,

    /// Persist the session into this JSON store directory
    #[arg(long, requires = "patient")]
    store: Option<PathBuf>,

    /// Patient id for --store
    #[arg(long)]
    patient: Option<String>,
}

fn parse_offset(text: &str) -> std::result::Result<Vector3<f64>, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected dx,dy,dz, got '{text}'"));
    };
    let axis = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid offset component '{s}'"))
    };
    Ok(Vector3::new(axis(x)?, axis(y)?, axis(z)?))
}

fn read_record(path: &Path) -> Result<TrajectoryRecord> {
    let file =
        File::open(path).with_context(|| format!("opening trajectory {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing trajectory {}", path.display()))
}

/// Fit and install the guide tube of `record`. A missing or unusable stored
/// radius falls back to the configured default, as the session loader does.
fn install_record(core: &mut RehabCore, record: &TrajectoryRecord) -> Result<()> {
    let tube = tube_from_record(record, core.config()).context("fitting guide tube")?;
    core.install_tube(tube);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !(cli.hz.is_finite() && cli.hz > 0.0) {
        bail!("--hz must be positive, got {}", cli.hz);
    }
    if !(cli.duration.is_finite() && cli.duration > 0.0) {
        bail!("--duration must be positive, got {}", cli.duration);
    }

    let config = match &cli.config {
        Some(path) => RehabConfig::from_json_file(path)?,
        None => RehabConfig::default(),
    };
    let record = read_record(&cli.trajectory)?;

    let mut core = RehabCore::new(config)?;
    install_record(&mut core, &record)?;
    let tube = core.tube().context("guide tube was not installed")?;
    info!(
        points = record.points.len(),
        radius = tube.radius(),
        mode = ?core.config().tracking.mode,
        "replaying"
    );

    let options = ReplayOptions {
        offset: cli.offset.unwrap_or_else(Vector3::zeros),
        noise: cli.noise,
        hz: cli.hz,
        duration: cli.duration,
        seed: cli.seed,
        hand: if cli.left {
            Handedness::Left
        } else {
            Handedness::Right
        },
    };
    let frames = patient_frames(tube.curve(), &options);
    let report = replay::run(&mut core, &frames, &options);

    if let (Some(root), Some(patient)) = (&cli.store, &cli.patient) {
        let mut store = JsonDirStore::open(root)?;
        let now = Utc::now();
        let trajectory_id = cli
            .trajectory
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("replay");
        let ctx = SessionContext::next_session(&store, patient, trajectory_id, now.date_naive())?;
        match core.complete_session(&ctx, &mut store, now) {
            PersistOutcome::Saved | PersistOutcome::AlreadyCompleted => {
                info!(session = %ctx.session_id, "session stored");
            }
            PersistOutcome::Failed(e) => return Err(e).context("storing session"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
