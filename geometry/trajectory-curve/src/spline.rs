//! Smooth interpolating splines through trajectory knots.
//!
//! The tolerance tube follows a cubic spline that passes exactly through
//! every knot. Tangents are derived automatically from the neighbouring knots
//! (auto-smooth); they are not exposed for manual tuning.

use crate::nearest::{NearestPoint, NearestPointMethod, nearest_point};
use crate::{Curve, CurveError, Result};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a knot's tangent is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TangentMode {
    /// Tangent computed from the neighbouring knots (C1 through the knot).
    #[default]
    AutoSmooth,
    /// Tangent along the straight line to the neighbouring knot.
    Linear,
}

/// A control point of a [`SmoothSpline`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Knot {
    /// Position the spline passes through.
    pub position: Point3<f64>,
    /// How the tangent at this knot was derived.
    pub mode: TangentMode,
    /// Hermite tangent at this knot (derivative per segment parameter).
    pub tangent: Vector3<f64>,
}

/// A cubic Bézier segment defined by 4 control points.
///
/// ```text
/// B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CubicSegment {
    /// Start point.
    pub p0: Point3<f64>,
    /// First control point (affects start tangent).
    pub p1: Point3<f64>,
    /// Second control point (affects end tangent).
    pub p2: Point3<f64>,
    /// End point.
    pub p3: Point3<f64>,
}

impl CubicSegment {
    /// Create a new cubic segment.
    #[must_use]
    pub const fn new(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Create a segment from endpoints and Hermite tangents.
    #[must_use]
    pub fn from_hermite(
        start: Point3<f64>,
        start_tangent: Vector3<f64>,
        end: Point3<f64>,
        end_tangent: Vector3<f64>,
    ) -> Self {
        Self::new(start, start + start_tangent / 3.0, end - end_tangent / 3.0, end)
    }
}

impl Curve for CubicSegment {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        let s2 = s * s;
        let t2 = t * t;

        Point3::from(
            self.p0.coords * (s2 * s)
                + self.p1.coords * (3.0 * s2 * t)
                + self.p2.coords * (3.0 * s * t2)
                + self.p3.coords * (t2 * t),
        )
    }

    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;

        // B'(t) = 3(1-t)²(P₁-P₀) + 6(1-t)t(P₂-P₁) + 3t²(P₃-P₂)
        (self.p1 - self.p0) * (3.0 * s * s)
            + (self.p2 - self.p1) * (6.0 * s * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }
}

/// A C1 cubic spline passing through every knot.
///
/// The global parameter `t ∈ [0, 1]` is split across segments in proportion
/// to their arc length, so equal steps in `t` cover roughly equal distance.
///
/// # Example
///
/// ```
/// use trajectory_curve::{Curve, SmoothSpline};
/// use nalgebra::Point3;
///
/// let spline = SmoothSpline::through_knots(&[
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
/// ]).unwrap();
///
/// assert_eq!(spline.num_segments(), 2);
/// assert!((spline.end().x - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothSpline {
    knots: Vec<Knot>,
    segments: Vec<CubicSegment>,
    /// Segment i covers t in [param_ranges[i], param_ranges[i+1]].
    param_ranges: Vec<f64>,
    total_length: f64,
}

impl SmoothSpline {
    /// Build an auto-smooth spline through the given knot positions.
    ///
    /// Interior tangents follow the Catmull-Rom rule (half the chord between
    /// the neighbours); end tangents follow the adjacent chord.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientPoints`] for fewer than 2 knots and
    /// [`CurveError::NonFinitePoint`] for NaN/infinite coordinates.
    pub fn through_knots(positions: &[Point3<f64>]) -> Result<Self> {
        if positions.len() < 2 {
            return Err(CurveError::insufficient_points(2, positions.len()));
        }
        if let Some(index) = positions
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(CurveError::NonFinitePoint { index });
        }

        let last = positions.len() - 1;
        let knots: Vec<Knot> = (0..positions.len())
            .map(|i| {
                let (tangent, mode) = if last == 1 {
                    (positions[1] - positions[0], TangentMode::Linear)
                } else if i == 0 {
                    (positions[1] - positions[0], TangentMode::AutoSmooth)
                } else if i == last {
                    (positions[last] - positions[last - 1], TangentMode::AutoSmooth)
                } else {
                    ((positions[i + 1] - positions[i - 1]) * 0.5, TangentMode::AutoSmooth)
                };
                Knot {
                    position: positions[i],
                    mode,
                    tangent,
                }
            })
            .collect();

        let segments: Vec<CubicSegment> = knots
            .windows(2)
            .map(|pair| {
                CubicSegment::from_hermite(
                    pair[0].position,
                    pair[0].tangent,
                    pair[1].position,
                    pair[1].tangent,
                )
            })
            .collect();

        Ok(Self::from_parts(knots, segments))
    }

    fn from_parts(knots: Vec<Knot>, segments: Vec<CubicSegment>) -> Self {
        let arc_lengths: Vec<f64> = segments.iter().map(Curve::arc_length).collect();
        let total_length: f64 = arc_lengths.iter().sum();

        let mut param_ranges = Vec::with_capacity(segments.len() + 1);
        param_ranges.push(0.0);

        if total_length > 1e-12 {
            let mut cumulative = 0.0;
            for len in &arc_lengths {
                cumulative += len;
                param_ranges.push(cumulative / total_length);
            }
        } else {
            // All knots coincide: fall back to uniform spans
            let n = segments.len() as f64;
            param_ranges.extend((1..=segments.len()).map(|i| i as f64 / n));
        }

        if let Some(last) = param_ranges.last_mut() {
            *last = 1.0;
        }

        Self {
            knots,
            segments,
            param_ranges,
            total_length,
        }
    }

    /// The knots the spline passes through.
    #[must_use]
    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    /// Knot positions in order.
    pub fn knot_positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.knots.iter().map(|k| k.position)
    }

    /// Get the number of segments.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Get all segments.
    #[must_use]
    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    /// Global parameter at which knot `index` is reached.
    #[must_use]
    pub fn knot_parameter(&self, index: usize) -> Option<f64> {
        self.param_ranges.get(index).copied()
    }

    /// Evaluate the position at global parameter `t ∈ [0, 1]`.
    #[must_use]
    pub fn evaluate_position(&self, t: f64) -> Point3<f64> {
        self.point_at(t)
    }

    /// Nearest point on the spline to `query` with the given search method.
    #[must_use]
    pub fn nearest_point(&self, query: &Point3<f64>, method: NearestPointMethod) -> NearestPoint {
        nearest_point(self, query, method)
    }

    /// Find which segment contains parameter `t` and compute the local parameter.
    fn segment_at(&self, t: f64) -> (usize, f64) {
        let last = self.segments.len() - 1;
        if t <= 0.0 {
            return (0, 0.0);
        }
        if t >= 1.0 {
            return (last, 1.0);
        }

        // First range boundary strictly beyond t closes the segment.
        let seg_idx = self.param_ranges[1..]
            .partition_point(|&end| end <= t)
            .min(last);
        let t_start = self.param_ranges[seg_idx];
        let t_end = self.param_ranges[seg_idx + 1];

        let local_t = if (t_end - t_start).abs() > 1e-12 {
            (t - t_start) / (t_end - t_start)
        } else {
            0.0
        };

        (seg_idx, local_t)
    }
}

impl Curve for SmoothSpline {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let (seg_idx, local_t) = self.segment_at(t);
        self.segments[seg_idx].point_at(local_t)
    }

    fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let (seg_idx, local_t) = self.segment_at(t);
        let seg_duration = self.param_ranges[seg_idx + 1] - self.param_ranges[seg_idx];
        if seg_duration > 1e-12 {
            self.segments[seg_idx].derivative_at(local_t) / seg_duration
        } else {
            Vector3::zeros()
        }
    }

    fn arc_length(&self) -> f64 {
        self.total_length
    }
}
