//! Arc-length resampling of recorded trajectories.
//!
//! A recording holds hundreds of samples spaced by hand speed. The spline is
//! built from a small, fixed budget of knots placed at equal intervals of
//! travelled distance instead of equal index steps.

use crate::polyline::compute_cumulative_lengths;
use crate::{CurveError, Result};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of knots produced from a recording.
pub const DEFAULT_KNOT_COUNT: usize = 15;

/// Total lengths below this are treated as a stationary recording.
pub const DEGENERATE_LENGTH: f64 = 1e-6;

/// Resamples an ordered point sequence to a fixed number of points evenly
/// spaced along its arc length.
///
/// # Example
///
/// ```
/// use trajectory_curve::ArcLengthResampler;
/// use nalgebra::Point3;
///
/// let recorded = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.1, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ];
///
/// let knots = ArcLengthResampler::new(5).resample(&recorded).unwrap();
/// assert_eq!(knots.len(), 5);
/// assert!((knots[2].x - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArcLengthResampler {
    knot_count: usize,
}

impl Default for ArcLengthResampler {
    fn default() -> Self {
        Self::new(DEFAULT_KNOT_COUNT)
    }
}

impl ArcLengthResampler {
    /// Create a resampler producing `knot_count` points (clamped to at least 2).
    #[must_use]
    pub fn new(knot_count: usize) -> Self {
        Self {
            knot_count: knot_count.max(2),
        }
    }

    /// Number of points each resampling produces.
    #[must_use]
    pub const fn knot_count(&self) -> usize {
        self.knot_count
    }

    /// Resample `points` by arc length.
    ///
    /// The output has exactly [`Self::knot_count`] points, starts at
    /// `points[0]` and ends at the last input point. A recording whose total
    /// length is below [`DEGENERATE_LENGTH`] yields just its first and last
    /// points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientPoints`] for fewer than 2 points.
    pub fn resample(&self, points: &[Point3<f64>]) -> Result<Vec<Point3<f64>>> {
        if points.len() < 2 {
            return Err(CurveError::insufficient_points(2, points.len()));
        }

        let (cumulative, total) = compute_cumulative_lengths(points);
        Ok(self.resample_with_lengths(points, &cumulative, total))
    }

    /// Resample using precomputed cumulative lengths.
    ///
    /// `cumulative` must have one entry per point, starting at 0 and
    /// non-decreasing, with `total` equal to its last entry.
    #[must_use]
    pub fn resample_with_lengths(
        &self,
        points: &[Point3<f64>],
        cumulative: &[f64],
        total: f64,
    ) -> Vec<Point3<f64>> {
        let first = points[0];
        let last = points[points.len() - 1];

        if total < DEGENERATE_LENGTH {
            return vec![first, last];
        }

        let n = self.knot_count;
        let last_segment = points.len() - 2;
        let mut result = Vec::with_capacity(n);
        result.push(first);

        for k in 1..n - 1 {
            let target = total * k as f64 / (n - 1) as f64;

            // Segment whose end is the first cumulative length reaching target.
            let upper = cumulative.partition_point(|&c| c < target);
            let idx = upper.saturating_sub(1).min(last_segment);

            let seg_start = cumulative[idx];
            let seg_end = cumulative[idx + 1];
            let alpha = if seg_end > seg_start {
                ((target - seg_start) / (seg_end - seg_start)).clamp(0.0, 1.0)
            } else {
                0.0
            };

            result.push(points[idx] + (points[idx + 1] - points[idx]) * alpha);
        }

        result.push(last);
        result
    }
}

/// Arc-length position of every point along the input path.
///
/// Useful for checking that resampled knots advance monotonically.
#[must_use]
pub fn arc_positions(points: &[Point3<f64>]) -> Vec<f64> {
    compute_cumulative_lengths(points).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_uniform_line() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let knots = ArcLengthResampler::new(11).resample(&points).unwrap();

        assert_eq!(knots.len(), 11);
        for (i, knot) in knots.iter().enumerate() {
            assert_relative_eq!(knot.x, i as f64, epsilon = 1e-10);
        }
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_uneven_sampling_is_evened_out() {
        // Dense at the start, sparse at the end
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.01, 0.0, 0.0),
            Point3::new(0.02, 0.0, 0.0),
            Point3::new(0.03, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let knots = ArcLengthResampler::new(5).resample(&points).unwrap();

        assert_eq!(knots.len(), 5);
        assert_relative_eq!(knots[1].x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(knots[2].coords, Point3::new(1.0, 0.0, 0.0).coords, epsilon = 1e-12);
        assert_relative_eq!(knots[3].y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(knots[4].coords, points[5].coords);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_degenerate_recording_returns_endpoints() {
        let p = Point3::new(0.3, 1.1, -0.2);
        let knots = ArcLengthResampler::default().resample(&[p, p, p, p]).unwrap();
        assert_eq!(knots, vec![p, p]);
    }

    #[test]
    fn test_insufficient_points() {
        let err = ArcLengthResampler::default()
            .resample(&[Point3::origin()])
            .unwrap_err();
        assert!(err.is_insufficient_points());
    }

    #[test]
    fn test_knot_count_clamped() {
        assert_eq!(ArcLengthResampler::new(0).knot_count(), 2);
        assert_eq!(ArcLengthResampler::new(1).knot_count(), 2);
        assert_eq!(ArcLengthResampler::default().knot_count(), DEFAULT_KNOT_COUNT);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_two_knots_are_endpoints() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.2, 0.0),
            Point3::new(1.0, 0.0, 0.3),
        ];
        let knots = ArcLengthResampler::new(2).resample(&points).unwrap();
        assert_eq!(knots, vec![points[0], points[2]]);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_trailing_duplicates_keep_last_point() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let knots = ArcLengthResampler::new(3).resample(&points).unwrap();
        assert_relative_eq!(knots[1].x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(knots[2].x, 1.0);
    }
}
