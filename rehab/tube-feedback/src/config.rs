//! Configuration for tube tracking and haptic feedback.
//!
//! # Example
//!
//! ```
//! use tube_feedback::{GrowthRule, ToleranceMode, TrackingConfig};
//!
//! let config = TrackingConfig::default()
//!     .with_mode(ToleranceMode::Zoned)
//!     .with_factors(1.0, 1.5)
//!     .with_growth(GrowthRule::default().with_streak_threshold(4));
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{FeedbackError, Result};
use trajectory_curve::NearestPointMethod;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default starting tube radius, in metres.
pub const DEFAULT_RADIUS: f64 = 0.05;

/// Smallest radius a tube may have.
pub const MIN_RADIUS: f64 = 0.001;

/// Largest radius a tube may have.
pub const MAX_RADIUS: f64 = 0.5;

fn check_finite_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FeedbackError::invalid_config(
            field,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn check_finite_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FeedbackError::invalid_config(
            field,
            format!("must be non-negative and finite, got {value}"),
        ))
    }
}

/// Allowed range of tube radii.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TubeBounds {
    /// Smallest radius.
    pub min_radius: f64,
    /// Largest radius.
    pub max_radius: f64,
}

impl Default for TubeBounds {
    fn default() -> Self {
        Self {
            min_radius: MIN_RADIUS,
            max_radius: MAX_RADIUS,
        }
    }
}

impl TubeBounds {
    /// Clamp `radius` into the bounds. NaN maps to `min_radius`.
    #[must_use]
    pub fn clamp(&self, radius: f64) -> f64 {
        if radius.is_nan() {
            return self.min_radius;
        }
        radius.clamp(self.min_radius, self.max_radius)
    }

    /// Check that the bounds form a non-empty positive range.
    pub fn validate(&self) -> Result<()> {
        check_finite_positive("min_radius", self.min_radius)?;
        check_finite_positive("max_radius", self.max_radius)?;
        if self.max_radius < self.min_radius {
            return Err(FeedbackError::invalid_config(
                "max_radius",
                format!("{} is below min_radius {}", self.max_radius, self.min_radius),
            ));
        }
        Ok(())
    }
}

/// How distance from the curve is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ToleranceMode {
    /// Inside or outside the radius.
    #[default]
    Binary,
    /// Inside, soft margin or hard margin, scaled from the radius.
    Zoned,
}

/// When and how much the tube widens after repeated exits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthRule {
    /// Whether the tube widens at all.
    pub enabled: bool,
    /// Exits since the last growth that trigger the next one.
    pub streak_threshold: u32,
    /// Growth only happens while the radius is at or below this.
    pub growth_limit: f64,
    /// Radius added per growth step.
    pub increment: f64,
}

impl Default for GrowthRule {
    fn default() -> Self {
        Self {
            enabled: true,
            streak_threshold: 3,
            growth_limit: 0.2,
            increment: 0.03,
        }
    }
}

impl GrowthRule {
    /// A rule that never grows the tube.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the streak threshold.
    #[must_use]
    pub const fn with_streak_threshold(mut self, threshold: u32) -> Self {
        self.streak_threshold = threshold;
        self
    }

    /// Set the radius above which growth stops.
    #[must_use]
    pub const fn with_growth_limit(mut self, limit: f64) -> Self {
        self.growth_limit = limit;
        self
    }

    /// Set the growth increment.
    #[must_use]
    pub const fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    /// Check the rule.
    pub fn validate(&self) -> Result<()> {
        if self.streak_threshold == 0 {
            return Err(FeedbackError::invalid_config(
                "streak_threshold",
                "must be at least 1",
            ));
        }
        check_finite_non_negative("growth_limit", self.growth_limit)?;
        check_finite_non_negative("increment", self.increment)
    }
}

/// Parameters of the [`ToleranceTracker`](crate::ToleranceTracker).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackingConfig {
    /// Binary or zoned classification.
    pub mode: ToleranceMode,
    /// Inside boundary as a multiple of the radius (zoned mode).
    pub soft_factor: f64,
    /// Hard-zone boundary as a multiple of the radius (zoned mode).
    pub hard_factor: f64,
    /// Adaptive radius growth.
    pub growth: GrowthRule,
    /// How distances to the curve are measured.
    pub nearest: NearestPointMethod,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            mode: ToleranceMode::Binary,
            soft_factor: 1.0,
            hard_factor: 1.5,
            growth: GrowthRule::default(),
            nearest: NearestPointMethod::default(),
        }
    }
}

impl TrackingConfig {
    /// Set the classification mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ToleranceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the soft and hard zone factors.
    #[must_use]
    pub const fn with_factors(mut self, soft: f64, hard: f64) -> Self {
        self.soft_factor = soft;
        self.hard_factor = hard;
        self
    }

    /// Set the growth rule.
    #[must_use]
    pub const fn with_growth(mut self, growth: GrowthRule) -> Self {
        self.growth = growth;
        self
    }

    /// Set the nearest-point method.
    #[must_use]
    pub const fn with_nearest(mut self, nearest: NearestPointMethod) -> Self {
        self.nearest = nearest;
        self
    }

    /// Check every value.
    ///
    /// # Errors
    ///
    /// Rejects non-positive factors, `hard_factor < soft_factor` and invalid
    /// growth rules.
    pub fn validate(&self) -> Result<()> {
        check_finite_positive("soft_factor", self.soft_factor)?;
        check_finite_positive("hard_factor", self.hard_factor)?;
        if self.hard_factor < self.soft_factor {
            return Err(FeedbackError::invalid_config(
                "hard_factor",
                format!(
                    "{} is below soft_factor {}",
                    self.hard_factor, self.soft_factor
                ),
            ));
        }
        if let NearestPointMethod::Refined { tolerance, .. } = self.nearest {
            check_finite_positive("nearest.tolerance", tolerance)?;
        }
        self.growth.validate()
    }
}

/// Parameters of the haptic mapping and dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HapticConfig {
    /// Distance past a zone boundary at which intensity saturates.
    pub max_excess: f64,
    /// Intensity right at the hard boundary.
    pub hard_min_intensity: f64,
    /// Intensity at `max_excess` past the hard boundary.
    pub hard_max_intensity: f64,
    /// Seconds of continuous stimulation before muting.
    pub saturation_secs: f64,
    /// Minimum seconds between `enter` calls on one channel.
    pub refresh_interval: f64,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            max_excess: 1.0,
            hard_min_intensity: 0.01,
            hard_max_intensity: 1.0,
            saturation_secs: 10.0,
            refresh_interval: 0.1,
        }
    }
}

impl HapticConfig {
    /// Set the saturation distance.
    #[must_use]
    pub const fn with_max_excess(mut self, max_excess: f64) -> Self {
        self.max_excess = max_excess;
        self
    }

    /// Set the hard-zone intensity range.
    #[must_use]
    pub const fn with_hard_range(mut self, min: f64, max: f64) -> Self {
        self.hard_min_intensity = min;
        self.hard_max_intensity = max;
        self
    }

    /// Set the mute timeout.
    #[must_use]
    pub const fn with_saturation_secs(mut self, secs: f64) -> Self {
        self.saturation_secs = secs;
        self
    }

    /// Set the actuator refresh interval.
    #[must_use]
    pub const fn with_refresh_interval(mut self, secs: f64) -> Self {
        self.refresh_interval = secs;
        self
    }

    /// Check every value.
    pub fn validate(&self) -> Result<()> {
        check_finite_positive("max_excess", self.max_excess)?;
        check_finite_positive("saturation_secs", self.saturation_secs)?;
        check_finite_non_negative("refresh_interval", self.refresh_interval)?;

        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.hard_min_intensity) || !in_unit(self.hard_max_intensity) {
            return Err(FeedbackError::invalid_config(
                "hard_min_intensity",
                "hard intensities must lie in [0, 1]",
            ));
        }
        if self.hard_max_intensity < self.hard_min_intensity {
            return Err(FeedbackError::invalid_config(
                "hard_max_intensity",
                "must not be below hard_min_intensity",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TubeBounds::default().validate().is_ok());
        assert!(TrackingConfig::default().validate().is_ok());
        assert!(HapticConfig::default().validate().is_ok());
        assert!(GrowthRule::disabled().validate().is_ok());
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = TubeBounds::default();
        assert!((bounds.clamp(2.0) - MAX_RADIUS).abs() < 1e-15);
        assert!((bounds.clamp(0.0) - MIN_RADIUS).abs() < 1e-15);
        assert!((bounds.clamp(f64::NAN) - MIN_RADIUS).abs() < 1e-15);
        assert!((bounds.clamp(0.07) - 0.07).abs() < 1e-15);

        let inverted = TubeBounds {
            min_radius: 0.3,
            max_radius: 0.1,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_tracking_config() {
        let err = TrackingConfig::default()
            .with_factors(1.5, 1.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("hard_factor"));

        assert!(
            TrackingConfig::default()
                .with_growth(GrowthRule::default().with_streak_threshold(0))
                .validate()
                .is_err()
        );
        assert!(
            TrackingConfig::default()
                .with_factors(0.0, 1.0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_rejects_bad_haptic_config() {
        assert!(HapticConfig::default().with_max_excess(0.0).validate().is_err());
        assert!(HapticConfig::default().with_hard_range(0.5, 0.2).validate().is_err());
        assert!(HapticConfig::default().with_hard_range(0.0, 1.5).validate().is_err());
        assert!(HapticConfig::default().with_saturation_secs(-1.0).validate().is_err());
    }
}
