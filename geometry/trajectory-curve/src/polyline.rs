//! Polyline (piecewise linear) curves.
//!
//! A recorded hand trajectory is a polyline: the ordered samples joined by
//! straight segments. Cumulative arc lengths are cached so that arc-length
//! lookups are a binary search.

use crate::{Curve, CurveError, Result};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piecewise linear curve defined by a sequence of vertices.
///
/// # Parameterization
///
/// The parameter `t ∈ [0, 1]` maps to the polyline based on arc length.
/// - `t = 0`: First vertex
/// - `t = 1`: Last vertex
/// - `t = 0.5`: Point at half the total arc length
///
/// # Example
///
/// ```
/// use trajectory_curve::{Polyline, Curve};
/// use nalgebra::Point3;
///
/// let polyline = Polyline::try_new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
/// ]).unwrap();
///
/// assert!((polyline.arc_length() - 2.0).abs() < 1e-10);
///
/// let mid = polyline.point_at(0.5);
/// assert!((mid.x - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    /// The vertices of the polyline.
    vertices: Vec<Point3<f64>>,
    /// Cumulative arc lengths at each vertex (precomputed).
    cumulative_lengths: Vec<f64>,
    /// Total arc length (cached).
    total_length: f64,
}

impl Polyline {
    /// Create a polyline, returning an error if it has fewer than 2 vertices
    /// or any non-finite coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientPoints`] if fewer than 2 vertices,
    /// [`CurveError::NonFinitePoint`] for NaN/infinite coordinates.
    pub fn try_new(vertices: Vec<Point3<f64>>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(CurveError::insufficient_points(2, vertices.len()));
        }
        if let Some(index) = vertices
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(CurveError::NonFinitePoint { index });
        }

        let (cumulative_lengths, total_length) = compute_cumulative_lengths(&vertices);

        Ok(Self {
            vertices,
            cumulative_lengths,
            total_length,
        })
    }

    /// Get the vertices of the polyline.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Cumulative arc length at each vertex; the first entry is 0.
    #[must_use]
    pub fn cumulative_lengths(&self) -> &[f64] {
        &self.cumulative_lengths
    }

    /// Get the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the polyline is empty (never true for a constructed polyline).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the number of segments (edges).
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Find which segment contains the given arc length.
    ///
    /// Returns `(segment_index, local_t)` where `local_t ∈ [0, 1]` is the
    /// parameter within that segment. Zero-length segments yield `local_t = 0`.
    #[must_use]
    pub fn segment_at_arc(&self, arc: f64) -> (usize, f64) {
        let last_segment = self.num_segments() - 1;
        if arc <= 0.0 {
            return (0, 0.0);
        }
        if arc >= self.total_length {
            return (last_segment, 1.0);
        }

        // First vertex whose cumulative length reaches `arc`.
        let upper = self.cumulative_lengths.partition_point(|&c| c < arc);
        let seg_idx = upper.saturating_sub(1).min(last_segment);
        let seg_start = self.cumulative_lengths[seg_idx];
        let seg_len = self.cumulative_lengths[seg_idx + 1] - seg_start;

        let local_t = if seg_len > 1e-12 {
            ((arc - seg_start) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };

        (seg_idx, local_t)
    }

    /// Position at the given arc length from the first vertex.
    ///
    /// Arc lengths outside `[0, total]` are clamped to the endpoints.
    #[must_use]
    pub fn point_at_arc(&self, arc: f64) -> Point3<f64> {
        let (seg_idx, local_t) = self.segment_at_arc(arc);
        let p0 = self.vertices[seg_idx];
        let p1 = self.vertices[seg_idx + 1];
        p0 + (p1 - p0) * local_t
    }
}

impl Curve for Polyline {
    fn point_at(&self, t: f64) -> Point3<f64> {
        self.point_at_arc(t.clamp(0.0, 1.0) * self.total_length)
    }

    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let (seg_idx, _) = self.segment_at_arc(t.clamp(0.0, 1.0) * self.total_length);
        let dir = self.vertices[seg_idx + 1] - self.vertices[seg_idx];
        let norm = dir.norm();
        if norm > 1e-12 {
            // |C'(t)| equals the total length under arc-length parameterization
            dir * (self.total_length / norm)
        } else {
            Vector3::zeros()
        }
    }

    fn arc_length(&self) -> f64 {
        self.total_length
    }

    fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for p in &self.vertices[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }

        (min, max)
    }
}

/// Compute cumulative arc lengths for a vertex list.
///
/// Returns the per-vertex prefix sums of segment lengths and the total.
#[must_use]
pub fn compute_cumulative_lengths(vertices: &[Point3<f64>]) -> (Vec<f64>, f64) {
    let mut cumulative = Vec::with_capacity(vertices.len());
    let mut total = 0.0;

    if vertices.is_empty() {
        return (cumulative, total);
    }

    cumulative.push(0.0);
    for pair in vertices.windows(2) {
        total += (pair[1] - pair[0]).norm();
        cumulative.push(total);
    }

    (cumulative, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_polyline_creation() {
        let polyline = Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ])
        .unwrap();

        assert_eq!(polyline.len(), 3);
        assert_eq!(polyline.num_segments(), 2);
        assert_relative_eq!(polyline.arc_length(), 2.0, epsilon = 1e-10);
        assert_eq!(polyline.cumulative_lengths(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_polyline_rejects_bad_input() {
        let err = Polyline::try_new(vec![Point3::origin()]).unwrap_err();
        assert_eq!(err, CurveError::insufficient_points(2, 1));

        let err =
            Polyline::try_new(vec![Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)]).unwrap_err();
        assert_eq!(err, CurveError::NonFinitePoint { index: 1 });
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_point_at_arc() {
        let polyline = Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
        ])
        .unwrap();

        assert_relative_eq!(polyline.arc_length(), 7.0, epsilon = 1e-10);
        assert_relative_eq!(polyline.point_at_arc(1.5).x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(polyline.point_at_arc(5.0).y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(polyline.point_at_arc(-1.0).coords, Point3::origin().coords);
        assert_relative_eq!(polyline.point_at_arc(99.0).y, 4.0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_zero_length_segments() {
        let polyline = Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ])
        .unwrap();

        let (seg, local) = polyline.segment_at_arc(1.0);
        assert_eq!(seg, 1);
        assert_relative_eq!(local, 0.5, epsilon = 1e-12);
        assert_relative_eq!(polyline.point_at(0.5).x, 1.0, epsilon = 1e-12);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_derivative_speed_matches_length() {
        let polyline = Polyline::try_new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
        ])
        .unwrap();

        assert_relative_eq!(polyline.derivative_at(0.1).norm(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(polyline.tangent_at(0.9), Vector3::y(), epsilon = 1e-12);
    }
}
