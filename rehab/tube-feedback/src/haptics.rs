//! Deviation to vibration intensity.
//!
//! Intensity grows linearly with how far the target is past the relevant
//! zone boundary and saturates `max_excess` metres past it:
//!
//! ```text
//! soft zone:  i = clamp01((d - soft) / max_excess)
//! hard zone:  i = lerp(hard_min, hard_max, clamp01((d - hard) / max_excess))
//! ```
//!
//! Continuous stimulation is capped by [`SaturationGuard`]: after
//! `saturation_secs` outside the safe zone the output is muted until the
//! target comes back inside.

use crate::config::HapticConfig;
use crate::zone::{Zone, ZoneRadii};
use nalgebra::{Point3, Vector3};
use tracing::info;

/// Maps deviation distance to an intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticIntensityMapper {
    config: HapticConfig,
}

impl HapticIntensityMapper {
    /// Create a mapper.
    #[must_use]
    pub const fn new(config: HapticConfig) -> Self {
        Self { config }
    }

    /// The mapping parameters.
    #[must_use]
    pub const fn config(&self) -> &HapticConfig {
        &self.config
    }

    fn excess_fraction(&self, distance: f64, boundary: f64) -> f64 {
        if self.config.max_excess <= 0.0 {
            return 1.0;
        }
        ((distance - boundary) / self.config.max_excess).clamp(0.0, 1.0)
    }

    /// Intensity for a target at `distance` in `zone`.
    ///
    /// # Example
    ///
    /// ```
    /// use tube_feedback::{HapticConfig, HapticIntensityMapper, Zone, ZoneRadii};
    ///
    /// let mapper = HapticIntensityMapper::new(HapticConfig::default());
    /// let radii = ZoneRadii { soft: 0.05, hard: 0.075 };
    ///
    /// assert_eq!(mapper.intensity(Zone::Inside, 0.01, radii), 0.0);
    /// assert!((mapper.intensity(Zone::OutsideHard, 0.075, radii) - 0.01).abs() < 1e-12);
    /// assert!((mapper.intensity(Zone::OutsideHard, 1.075, radii) - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn intensity(&self, zone: Zone, distance: f64, radii: ZoneRadii) -> f64 {
        match zone {
            Zone::Inside => 0.0,
            Zone::OutsideSoft => self.excess_fraction(distance, radii.soft),
            Zone::OutsideHard => {
                let t = self.excess_fraction(distance, radii.hard);
                let (lo, hi) = (self.config.hard_min_intensity, self.config.hard_max_intensity);
                lo + (hi - lo) * t
            }
        }
    }

    /// Direction from the curve toward the target, scaled by `intensity`.
    ///
    /// Zero when the target sits on the curve.
    #[must_use]
    pub fn direction(curve_point: &Point3<f64>, target: &Point3<f64>, intensity: f64) -> Vector3<f64> {
        let offset = target - curve_point;
        let norm = offset.norm();
        if norm > 1e-12 {
            offset * (intensity / norm)
        } else {
            Vector3::zeros()
        }
    }
}

/// Mutes feedback after prolonged continuous stimulation.
///
/// The timer runs while the target is in any outside zone and resets the
/// first tick it is back inside, which also lifts the mute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationGuard {
    limit: f64,
    active_time: f64,
    muted: bool,
}

impl SaturationGuard {
    /// A guard muting after `limit` seconds.
    #[must_use]
    pub const fn new(limit: f64) -> Self {
        Self {
            limit,
            active_time: 0.0,
            muted: false,
        }
    }

    /// Seconds of continuous stimulation so far.
    #[must_use]
    pub const fn active_time(&self) -> f64 {
        self.active_time
    }

    /// True while muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Account for one tick in `zone`; returns whether output is muted.
    pub fn update(&mut self, zone: Zone, dt: f64) -> bool {
        if !zone.is_outside() {
            if self.muted {
                info!(after_secs = self.active_time, "haptic mute released");
            }
            self.active_time = 0.0;
            self.muted = false;
            return false;
        }

        if dt.is_finite() && dt > 0.0 {
            self.active_time += dt;
        }
        if !self.muted && self.active_time >= self.limit {
            self.muted = true;
            info!(limit_secs = self.limit, "haptic output muted after continuous stimulation");
        }
        self.muted
    }

    /// Clear the timer and mute.
    pub fn reset(&mut self) {
        self.active_time = 0.0;
        self.muted = false;
    }
}
