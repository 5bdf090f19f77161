//! The tolerance tube: guide curve plus radius.

use crate::config::{DEFAULT_RADIUS, TubeBounds};
use crate::error::{FeedbackError, Result};
use nalgebra::Point3;
use std::sync::Arc;
use trajectory_curve::{NearestPoint, NearestPointMethod, SmoothSpline};

/// A guide spline with an acceptance radius.
///
/// The radius is clamped to [`TubeBounds`] and, once a session is running,
/// only ever grows. The spline is shared behind an [`Arc`]: swapping in a
/// newly built tube replaces the whole value at once.
#[derive(Debug, Clone)]
pub struct ToleranceTube {
    curve: Arc<SmoothSpline>,
    radius: f64,
    bounds: TubeBounds,
}

impl ToleranceTube {
    /// Build a tube, clamping `radius` into `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::InvalidRadius`] for NaN, infinite or
    /// non-positive radii.
    pub fn new(curve: impl Into<Arc<SmoothSpline>>, radius: f64, bounds: TubeBounds) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(FeedbackError::InvalidRadius { radius });
        }
        Ok(Self {
            curve: curve.into(),
            radius: bounds.clamp(radius),
            bounds,
        })
    }

    /// A tube with [`DEFAULT_RADIUS`] and default bounds.
    #[must_use]
    pub fn with_default_radius(curve: impl Into<Arc<SmoothSpline>>) -> Self {
        Self {
            curve: curve.into(),
            radius: DEFAULT_RADIUS,
            bounds: TubeBounds::default(),
        }
    }

    /// The guide curve.
    #[must_use]
    pub fn curve(&self) -> &SmoothSpline {
        &self.curve
    }

    /// Shared handle to the guide curve.
    #[must_use]
    pub fn shared_curve(&self) -> Arc<SmoothSpline> {
        Arc::clone(&self.curve)
    }

    /// Current radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Radius bounds.
    #[must_use]
    pub const fn bounds(&self) -> TubeBounds {
        self.bounds
    }

    /// Widen by `increment`, stopping at the upper bound. Returns the new
    /// radius. Negative increments are ignored.
    pub fn grow(&mut self, increment: f64) -> f64 {
        if increment.is_finite() && increment > 0.0 {
            self.radius = self.bounds.clamp(self.radius + increment);
        }
        self.radius
    }

    /// Nearest point on the guide curve.
    #[must_use]
    pub fn nearest(&self, query: &Point3<f64>, method: NearestPointMethod) -> NearestPoint {
        self.curve.nearest_point(query, method)
    }

    /// Radius rounded to whole millimetres, never below 1 mm.
    #[must_use]
    pub fn radius_mm_rounded(&self) -> f64 {
        round_to_mm(self.radius)
    }
}

/// Round a length in metres to whole millimetres, with a 1 mm floor.
#[must_use]
pub fn round_to_mm(metres: f64) -> f64 {
    ((metres * 1000.0).round() / 1000.0).max(0.001)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[allow(clippy::unwrap_used)]
    fn line() -> SmoothSpline {
        SmoothSpline::through_knots(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).unwrap()
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_radius_clamped_on_build() {
        let tube = ToleranceTube::new(line(), 3.0, TubeBounds::default()).unwrap();
        assert_relative_eq!(tube.radius(), 0.5);

        let tube = ToleranceTube::new(line(), 0.0001, TubeBounds::default()).unwrap();
        assert_relative_eq!(tube.radius(), 0.001);

        assert!(ToleranceTube::new(line(), f64::NAN, TubeBounds::default()).is_err());
        assert!(ToleranceTube::new(line(), -0.1, TubeBounds::default()).is_err());
    }

    #[test]
    fn test_grow_is_monotonic_and_bounded() {
        let mut tube = ToleranceTube::with_default_radius(line());
        assert_relative_eq!(tube.grow(0.03), 0.08, epsilon = 1e-12);
        assert_relative_eq!(tube.grow(-1.0), 0.08, epsilon = 1e-12);
        for _ in 0..100 {
            tube.grow(0.03);
        }
        assert_relative_eq!(tube.radius(), 0.5);
    }

    #[test]
    fn test_nearest_and_rounding() {
        let tube = ToleranceTube::with_default_radius(line());
        let hit = tube.nearest(&Point3::new(0.5, 0.2, 0.0), NearestPointMethod::default());
        assert_relative_eq!(hit.distance, 0.2, epsilon = 1e-9);

        assert_relative_eq!(round_to_mm(0.0526), 0.053, epsilon = 1e-12);
        assert_relative_eq!(round_to_mm(0.0002), 0.001, epsilon = 1e-12);
        assert_relative_eq!(tube.radius_mm_rounded(), 0.05, epsilon = 1e-12);
    }
}
