//! Top-level configuration.
//!
//! [`RehabConfig`] gathers the settings of every layer. It can be written
//! in code with the `with_*` builders or loaded from JSON; missing fields
//! take their defaults, so a file only needs the values it changes:
//!
//! ```json
//! {
//!   "knot_count": 20,
//!   "tracking": { "mode": "zoned" },
//!   "scoring": { "t_min": 60.0 }
//! }
//! ```

use crate::error::{Result, SessionError};
use crate::scorer::ScoreThresholds;
use hand_tracking::{RecordingFlowConfig, SamplerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trajectory_curve::DEFAULT_KNOT_COUNT;
use tube_feedback::{DEFAULT_RADIUS, HapticConfig, TrackingConfig, TubeBounds};

/// Settings for the whole record / track / score pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RehabConfig {
    /// Therapist trajectory sampling.
    pub sampler: SamplerConfig,
    /// Patient path sampling.
    pub patient_sampler: SamplerConfig,
    /// Countdown and record window.
    pub flow: RecordingFlowConfig,
    /// Zone classification and radius growth.
    pub tracking: TrackingConfig,
    /// Intensity mapping, mute and dispatch.
    pub haptics: HapticConfig,
    /// Star ladder thresholds.
    pub scoring: ScoreThresholds,
    /// Allowed tube radii.
    pub bounds: TubeBounds,
    /// Starting radius when a trajectory carries none.
    pub default_radius: f64,
    /// Knots in the guide spline.
    pub knot_count: usize,
}

impl Default for RehabConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            patient_sampler: SamplerConfig::patient(),
            flow: RecordingFlowConfig::default(),
            tracking: TrackingConfig::default(),
            haptics: HapticConfig::default(),
            scoring: ScoreThresholds::default(),
            bounds: TubeBounds::default(),
            default_radius: DEFAULT_RADIUS,
            knot_count: DEFAULT_KNOT_COUNT,
        }
    }
}

impl RehabConfig {
    /// Set the tracking configuration.
    #[must_use]
    pub const fn with_tracking(mut self, tracking: TrackingConfig) -> Self {
        self.tracking = tracking;
        self
    }

    /// Set the haptic configuration.
    #[must_use]
    pub const fn with_haptics(mut self, haptics: HapticConfig) -> Self {
        self.haptics = haptics;
        self
    }

    /// Set the scoring thresholds.
    #[must_use]
    pub const fn with_scoring(mut self, scoring: ScoreThresholds) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set the therapist sampler configuration.
    #[must_use]
    pub const fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    /// Set the starting radius for records without one.
    #[must_use]
    pub const fn with_default_radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }

    /// Set the knot count.
    #[must_use]
    pub const fn with_knot_count(mut self, knot_count: usize) -> Self {
        self.knot_count = knot_count;
        self
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConfigRead`] / [`SessionError::ConfigParse`]
    /// for unreadable or malformed files and any [`Self::validate`] error.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SessionError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text).map_err(|source| SessionError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Rejects knot counts below 2, non-finite or non-positive radii,
    /// `hard_factor < soft_factor`, zero sampling intervals and negative
    /// flow timings.
    pub fn validate(&self) -> Result<()> {
        if self.knot_count < 2 {
            return Err(SessionError::invalid_config(
                "knot_count",
                format!("must be at least 2, got {}", self.knot_count),
            ));
        }
        if !(self.default_radius.is_finite() && self.default_radius > 0.0) {
            return Err(SessionError::invalid_config(
                "default_radius",
                format!("must be positive and finite, got {}", self.default_radius),
            ));
        }
        for (field, secs) in [
            ("flow.countdown", self.flow.countdown),
            ("flow.record_window", self.flow.record_window),
        ] {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(SessionError::invalid_config(
                    field,
                    format!("must be non-negative, got {secs}"),
                ));
            }
        }
        if !self.scoring.t_min.is_finite() {
            return Err(SessionError::invalid_config(
                "scoring.t_min",
                "must be finite",
            ));
        }
        self.sampler.validate()?;
        self.patient_sampler.validate()?;
        self.bounds.validate()?;
        self.tracking.validate()?;
        self.haptics.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tube_feedback::ToleranceMode;

    #[test]
    fn test_defaults() {
        let config = RehabConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.knot_count, 15);
        assert_relative_eq!(config.default_radius, 0.05);
        assert_relative_eq!(config.patient_sampler.min_distance, 0.005);
        assert_relative_eq!(config.sampler.min_distance, 0.01);
        assert_eq!(config.scoring.error_threshold, 6);
    }

    #[test]
    fn test_partial_json() {
        let config = RehabConfig::from_json_str(
            r#"{ "knot_count": 20, "tracking": { "mode": "zoned" }, "scoring": { "t_min": 60.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.knot_count, 20);
        assert_eq!(config.tracking.mode, ToleranceMode::Zoned);
        assert_relative_eq!(config.tracking.hard_factor, 1.5);
        assert_relative_eq!(config.scoring.t_min, 60.0);
        assert_eq!(config.scoring.error_threshold, 6);
    }

    #[test]
    fn test_validation_failures() {
        assert!(RehabConfig::default().with_knot_count(1).validate().is_err());
        assert!(
            RehabConfig::default()
                .with_default_radius(f64::NAN)
                .validate()
                .is_err()
        );
        let zero_interval = RehabConfig::default().with_sampler(SamplerConfig::default().with_interval(0.0));
        assert!(matches!(
            zero_interval.validate(),
            Err(SessionError::Recording(_))
        ));
        let inverted = RehabConfig::default()
            .with_tracking(TrackingConfig::default().with_factors(1.5, 1.0));
        assert!(matches!(inverted.validate(), Err(SessionError::Feedback(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_radius": 0.08 }}"#).unwrap();
        let config = RehabConfig::from_json_file(file.path()).unwrap();
        assert_relative_eq!(config.default_radius, 0.08);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{ "knot_count": 1 }}"#).unwrap();
        assert!(RehabConfig::from_json_file(bad.path()).unwrap_err().is_config());

        let missing = RehabConfig::from_json_file("/nonexistent/rehab.json");
        assert!(matches!(missing, Err(SessionError::ConfigRead { .. })));
    }
}
