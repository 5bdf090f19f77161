//! Per-frame tolerance tracking.
//!
//! Each tick the tracker measures the target's distance to the guide curve,
//! classifies it into a [`Zone`], counts tube exits, widens the tube after
//! repeated exits and computes the haptic output.
//!
//! Two error counters are kept. `total_errors` is the lifetime count used
//! for scoring. `streak` counts exits since the last growth step and is the
//! only one reset by growth.

use crate::config::{HapticConfig, TrackingConfig};
use crate::haptics::{HapticIntensityMapper, SaturationGuard};
use crate::tube::ToleranceTube;
use crate::zone::{Zone, ZoneRadii};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info};
use trajectory_curve::NearestPoint;

/// Outcome of one [`ToleranceTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingUpdate {
    /// False when there was no tube or no valid target; everything else is
    /// then neutral.
    pub active: bool,
    /// Zone after this tick.
    pub zone: Zone,
    /// Distance to the guide curve.
    pub distance: f64,
    /// Nearest curve point, when active.
    pub nearest: Option<NearestPoint>,
    /// Errors added this tick (0 or 1).
    pub error_delta: u32,
    /// Haptic intensity in `[0, 1]`, zero when muted.
    pub intensity: f64,
    /// Unit direction from curve to target scaled by `intensity`.
    pub direction: Vector3<f64>,
    /// Whether the saturation guard is muting output.
    pub muted: bool,
    /// The radius grew on this tick.
    pub radius_grew: bool,
    /// Tube radius after this tick.
    pub radius: f64,
}

impl TrackingUpdate {
    /// The neutral update reported while the tube or target is unavailable.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            active: false,
            zone: Zone::Inside,
            distance: 0.0,
            nearest: None,
            error_delta: 0,
            intensity: 0.0,
            direction: Vector3::zeros(),
            muted: false,
            radius_grew: false,
            radius: 0.0,
        }
    }
}

/// Accumulated tracking counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingStats {
    /// Lifetime tube exits.
    pub total_errors: u32,
    /// Exits since the last growth step.
    pub streak: u32,
    /// Seconds tracked in total.
    pub elapsed: f64,
    /// Seconds spent inside.
    pub time_inside: f64,
    /// Seconds spent outside.
    pub time_outside: f64,
    /// Number of growth steps taken.
    pub growth_steps: u32,
}

impl TrackingStats {
    /// Percentage of tracked time spent inside, 0 when nothing was tracked.
    #[must_use]
    pub fn inside_percentage(&self) -> f64 {
        if self.elapsed > 0.0 {
            (self.elapsed - self.time_outside) / self.elapsed * 100.0
        } else {
            0.0
        }
    }
}

/// Tracks a moving target against a [`ToleranceTube`].
#[derive(Debug, Clone)]
pub struct ToleranceTracker {
    config: TrackingConfig,
    mapper: HapticIntensityMapper,
    guard: SaturationGuard,
    tube: Option<ToleranceTube>,
    zone: Zone,
    stats: TrackingStats,
}

impl ToleranceTracker {
    /// A tracker with no tube installed.
    #[must_use]
    pub fn new(config: TrackingConfig, haptics: HapticConfig) -> Self {
        Self {
            config,
            mapper: HapticIntensityMapper::new(haptics),
            guard: SaturationGuard::new(haptics.saturation_secs),
            tube: None,
            zone: Zone::Inside,
            stats: TrackingStats::default(),
        }
    }

    /// Tracking parameters.
    #[must_use]
    pub const fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Replace the tube in one step. Zone and mute state start fresh; the
    /// counters are kept.
    pub fn install_tube(&mut self, tube: ToleranceTube) {
        info!(
            radius = tube.radius(),
            knots = tube.curve().knots().len(),
            "tolerance tube installed"
        );
        self.tube = Some(tube);
        self.zone = Zone::Inside;
        self.guard.reset();
    }

    /// Remove the tube; updates go idle until a new one is installed.
    pub fn remove_tube(&mut self) -> Option<ToleranceTube> {
        self.zone = Zone::Inside;
        self.guard.reset();
        self.tube.take()
    }

    /// The installed tube.
    #[must_use]
    pub const fn tube(&self) -> Option<&ToleranceTube> {
        self.tube.as_ref()
    }

    /// Current zone.
    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> &TrackingStats {
        &self.stats
    }

    /// Clear counters, zone and mute for a new session. The tube stays.
    pub fn reset_session(&mut self) {
        self.stats = TrackingStats::default();
        self.zone = Zone::Inside;
        self.guard.reset();
    }

    /// Advance one tick of `dt` seconds with the target at `target`.
    ///
    /// `None`, a non-finite target or a missing tube yield
    /// [`TrackingUpdate::idle`] and change nothing.
    pub fn update(&mut self, target: Option<Point3<f64>>, dt: f64) -> TrackingUpdate {
        let Some(tube) = self.tube.as_mut() else {
            return TrackingUpdate::idle();
        };
        let Some(target) = target.filter(|p| p.coords.iter().all(|c| c.is_finite())) else {
            return TrackingUpdate::idle();
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let nearest = tube.nearest(&target, self.config.nearest);
        let radii = ZoneRadii::for_radius(&self.config, tube.radius());
        let zone = radii.classify(nearest.distance);

        self.stats.elapsed += dt;
        if zone.is_outside() {
            self.stats.time_outside += dt;
        } else {
            self.stats.time_inside += dt;
        }

        let error_delta = u32::from(!self.zone.is_outside() && zone.is_outside());
        self.stats.total_errors += error_delta;
        self.stats.streak += error_delta;

        let growth = self.config.growth;
        let mut radius_grew = false;
        if growth.enabled
            && self.stats.streak >= growth.streak_threshold
            && tube.radius() <= growth.growth_limit
        {
            let before = tube.radius();
            let after = tube.grow(growth.increment);
            self.stats.streak = 0;
            radius_grew = after > before;
            if radius_grew {
                self.stats.growth_steps += 1;
            }
            info!(
                from = before,
                to = after,
                total_errors = self.stats.total_errors,
                "tube radius widened after repeated exits"
            );
        }

        if zone != self.zone {
            debug!(from = ?self.zone, to = ?zone, distance = nearest.distance, "zone change");
        }
        self.zone = zone;

        let muted = self.guard.update(zone, dt);
        let intensity = if muted {
            0.0
        } else {
            self.mapper.intensity(zone, nearest.distance, radii)
        };
        let direction = HapticIntensityMapper::direction(&nearest.point, &target, intensity);

        TrackingUpdate {
            active: true,
            zone,
            distance: nearest.distance,
            nearest: Some(nearest),
            error_delta,
            intensity,
            direction,
            muted,
            radius_grew,
            radius: tube.radius(),
        }
    }
}
