//! Distance zones around the tube.

use crate::config::{ToleranceMode, TrackingConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where the target is relative to the tube.
///
/// In [`ToleranceMode::Binary`] only `Inside` and `OutsideHard` occur, with
/// the hard boundary at the radius itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Zone {
    /// Within tolerance; no feedback.
    #[default]
    Inside,
    /// Between the soft and hard boundaries; proportional feedback.
    OutsideSoft,
    /// Beyond the hard boundary; strong feedback.
    OutsideHard,
}

impl Zone {
    /// True for either outside zone.
    #[must_use]
    pub const fn is_outside(self) -> bool {
        !matches!(self, Self::Inside)
    }
}

/// Zone boundaries in metres for one radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneRadii {
    /// Inside boundary (inclusive).
    pub soft: f64,
    /// Hard boundary (inclusive on the soft side).
    pub hard: f64,
}

impl ZoneRadii {
    /// Boundaries for `radius` under `config`.
    #[must_use]
    pub fn for_radius(config: &TrackingConfig, radius: f64) -> Self {
        match config.mode {
            ToleranceMode::Binary => Self {
                soft: radius,
                hard: radius,
            },
            ToleranceMode::Zoned => Self {
                soft: radius * config.soft_factor,
                hard: radius * config.hard_factor,
            },
        }
    }

    /// Classify a distance.
    ///
    /// # Example
    ///
    /// ```
    /// use tube_feedback::{Zone, ZoneRadii};
    ///
    /// let radii = ZoneRadii { soft: 0.05, hard: 0.075 };
    /// assert_eq!(radii.classify(0.05), Zone::Inside);
    /// assert_eq!(radii.classify(0.06), Zone::OutsideSoft);
    /// assert_eq!(radii.classify(0.075), Zone::OutsideSoft);
    /// assert_eq!(radii.classify(0.08), Zone::OutsideHard);
    /// ```
    #[must_use]
    pub fn classify(&self, distance: f64) -> Zone {
        if distance <= self.soft {
            Zone::Inside
        } else if distance <= self.hard {
            Zone::OutsideSoft
        } else {
            Zone::OutsideHard
        }
    }
}
