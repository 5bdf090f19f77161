//! Nearest-point queries against a curve.
//!
//! The default query scans the curve at a fixed number of parameter steps
//! and keeps the closest sample. That bounds the per-frame cost and keeps
//! distances reproducible between runs. [`NearestPointMethod::Refined`]
//! adds a golden-section search around the best sample.

use crate::Curve;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameter steps used by the default scan.
pub const DEFAULT_SCAN_STEPS: usize = 100;

/// Bracket width (in parameter space) below which refinement stops.
pub const DEFAULT_REFINE_TOLERANCE: f64 = 1e-8;

/// How the nearest point on a curve is located.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum NearestPointMethod {
    /// Evaluate `t = i / steps` for `i in 0..=steps` and keep the minimum.
    Sampled {
        /// Number of parameter steps.
        steps: usize,
    },
    /// Sampled scan followed by golden-section refinement within one step
    /// either side of the best sample.
    Refined {
        /// Number of parameter steps for the initial scan.
        steps: usize,
        /// Bracket width at which refinement stops.
        tolerance: f64,
    },
}

impl Default for NearestPointMethod {
    fn default() -> Self {
        Self::Sampled {
            steps: DEFAULT_SCAN_STEPS,
        }
    }
}

impl NearestPointMethod {
    /// Scan followed by refinement with default settings.
    #[must_use]
    pub const fn refined() -> Self {
        Self::Refined {
            steps: DEFAULT_SCAN_STEPS,
            tolerance: DEFAULT_REFINE_TOLERANCE,
        }
    }

    /// Number of scan steps (at least 1).
    #[must_use]
    pub fn steps(&self) -> usize {
        match *self {
            Self::Sampled { steps } | Self::Refined { steps, .. } => steps.max(1),
        }
    }
}

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    /// Closest point found on the curve.
    pub point: Point3<f64>,
    /// Curve parameter of that point.
    pub t: f64,
    /// Euclidean distance from the query to `point`.
    pub distance: f64,
}

/// Find the point on `curve` closest to `query`.
///
/// Ties keep the lowest parameter.
///
/// # Example
///
/// ```
/// use trajectory_curve::{nearest_point, NearestPointMethod, Polyline};
/// use nalgebra::Point3;
///
/// let line = Polyline::try_new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 0.0, 0.0),
/// ]).unwrap();
///
/// let hit = nearest_point(&line, &Point3::new(5.0, 3.0, 0.0), NearestPointMethod::default());
/// assert!((hit.distance - 3.0).abs() < 1e-9);
/// assert!((hit.t - 0.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn nearest_point<C: Curve + ?Sized>(
    curve: &C,
    query: &Point3<f64>,
    method: NearestPointMethod,
) -> NearestPoint {
    let steps = method.steps();
    let coarse = scan(curve, query, steps);

    match method {
        NearestPointMethod::Sampled { .. } => coarse,
        NearestPointMethod::Refined { tolerance, .. } => {
            let refined = refine(curve, query, coarse.t, 1.0 / steps as f64, tolerance);
            // Refinement never makes the answer worse than the scan.
            if refined.distance < coarse.distance {
                refined
            } else {
                coarse
            }
        }
    }
}

fn scan<C: Curve + ?Sized>(curve: &C, query: &Point3<f64>, steps: usize) -> NearestPoint {
    let mut best = NearestPoint {
        point: curve.point_at(0.0),
        t: 0.0,
        distance: f64::MAX,
    };

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = curve.point_at(t);
        let distance = (p - query).norm();

        if distance < best.distance {
            best = NearestPoint {
                point: p,
                t,
                distance,
            };
        }
    }

    best
}

fn refine<C: Curve + ?Sized>(
    curve: &C,
    query: &Point3<f64>,
    center: f64,
    half_width: f64,
    tolerance: f64,
) -> NearestPoint {
    let golden = (5.0_f64.sqrt() - 1.0) / 2.0;
    let tolerance = tolerance.max(f64::EPSILON);
    let dist = |t: f64| (curve.point_at(t) - query).norm();

    let mut a = (center - half_width).max(0.0);
    let mut b = (center + half_width).min(1.0);

    let mut c = b - golden * (b - a);
    let mut d = a + golden * (b - a);

    while (b - a) > tolerance {
        if dist(c) < dist(d) {
            b = d;
            d = c;
            c = b - golden * (b - a);
        } else {
            a = c;
            c = d;
            d = a + golden * (b - a);
        }
    }

    let t = (a + b) / 2.0;
    let point = curve.point_at(t);
    NearestPoint {
        point,
        t,
        distance: (point - query).norm(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Polyline, SmoothSpline};
    use approx::assert_relative_eq;

    #[allow(clippy::unwrap_used)]
    fn line() -> Polyline {
        Polyline::try_new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_point_on_line() {
        let hit = nearest_point(&line(), &Point3::new(5.0, 0.0, 0.0), NearestPointMethod::default());
        assert_relative_eq!(hit.t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hit.distance, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_beyond_endpoints_clamps() {
        let hit = nearest_point(&line(), &Point3::new(-4.0, 3.0, 0.0), NearestPointMethod::default());
        assert_relative_eq!(hit.t, 0.0);
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sampled_is_quantized() {
        // 0.537 lies between scan steps 0.53 and 0.54
        let query = Point3::new(5.37, 1.0, 0.0);
        let sampled = nearest_point(&line(), &query, NearestPointMethod::default());
        let refined = nearest_point(&line(), &query, NearestPointMethod::refined());

        assert_relative_eq!(sampled.t, 0.54, epsilon = 1e-12);
        assert!(sampled.distance > 1.0);
        assert_relative_eq!(refined.t, 0.537, epsilon = 1e-6);
        assert_relative_eq!(refined.distance, 1.0, epsilon = 1e-9);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_refined_never_worse_on_spline() {
        let spline = SmoothSpline::through_knots(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.3, 0.2, 0.0),
            Point3::new(0.6, 0.0, 0.1),
            Point3::new(0.9, 0.2, 0.0),
        ])
        .unwrap();

        for query in [
            Point3::new(0.1, 0.3, 0.0),
            Point3::new(0.45, -0.1, 0.05),
            Point3::new(1.0, 1.0, 1.0),
        ] {
            let sampled = spline.nearest_point(&query, NearestPointMethod::default());
            let refined = spline.nearest_point(&query, NearestPointMethod::refined());
            assert!(refined.distance <= sampled.distance + 1e-15);
        }
    }

    #[test]
    fn test_zero_steps_treated_as_one() {
        let method = NearestPointMethod::Sampled { steps: 0 };
        assert_eq!(method.steps(), 1);
        let hit = nearest_point(&line(), &Point3::new(9.0, 0.0, 0.0), method);
        assert_relative_eq!(hit.t, 1.0);
    }
}
