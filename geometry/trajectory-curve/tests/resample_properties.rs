//! Property-based tests for resampling and spline fitting.
//!
//! Run with: cargo test -p trajectory-curve --test resample_properties

#![allow(clippy::unwrap_used)]

use nalgebra::Point3;
use proptest::prelude::*;
use trajectory_curve::{
    ArcLengthResampler, Curve, DEGENERATE_LENGTH, NearestPointMethod, Polyline, SmoothSpline,
    arc_positions,
};

// =============================================================================
// Strategies
// =============================================================================

/// A position inside a one-metre reach volume.
fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-1.0..1.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// A recording with at least two samples.
fn arb_recording(max: usize) -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec(arb_position(), 2..=max)
}

/// Arc position of `point` on `polyline`, taking the first segment at or
/// after `from` that contains it.
fn arc_position_from(polyline: &Polyline, point: &Point3<f64>, from: usize) -> Option<(usize, f64)> {
    let vertices = polyline.vertices();
    let cumulative = polyline.cumulative_lengths();
    (from..polyline.num_segments()).find_map(|i| {
        let (a, b) = (vertices[i], vertices[i + 1]);
        let ab = b - a;
        let len_sq = ab.norm_squared();
        let t = if len_sq > 0.0 {
            ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ((a + ab * t - point).norm() < 1e-9).then(|| (i, cumulative[i] + t * ab.norm()))
    })
}

// =============================================================================
// Properties: Resampling
// =============================================================================

proptest! {
    /// Output size is the knot count unless the recording is stationary.
    #[test]
    fn resample_has_requested_size(points in arb_recording(60), n in 2usize..40) {
        let knots = ArcLengthResampler::new(n).resample(&points).unwrap();
        let total = *arc_positions(&points).last().unwrap();

        if total < DEGENERATE_LENGTH {
            prop_assert_eq!(knots.len(), 2);
        } else {
            prop_assert_eq!(knots.len(), n);
        }
    }

    /// Endpoints are preserved exactly.
    #[test]
    fn resample_keeps_endpoints(points in arb_recording(60), n in 2usize..40) {
        let knots = ArcLengthResampler::new(n).resample(&points).unwrap();
        prop_assert_eq!(knots[0], points[0]);
        prop_assert_eq!(knots[knots.len() - 1], points[points.len() - 1]);
    }

    /// Every knot lies on the recorded path at its expected arc position.
    #[test]
    fn resample_knots_lie_on_path(points in arb_recording(40), n in 3usize..30) {
        let polyline = Polyline::try_new(points.clone()).unwrap();
        let total = polyline.arc_length();
        prop_assume!(total >= DEGENERATE_LENGTH);

        let knots = ArcLengthResampler::new(n).resample(&points).unwrap();
        for (k, knot) in knots.iter().enumerate() {
            let expected = polyline.point_at_arc(total * k as f64 / (n - 1) as f64);
            prop_assert!((knot - expected).norm() < 1e-9);
        }
    }

    /// Knots advance along the recorded path: projected back onto it, their
    /// arc positions never decrease.
    #[test]
    fn resample_knots_advance_along_path(points in arb_recording(40), n in 3usize..30) {
        let polyline = Polyline::try_new(points.clone()).unwrap();
        prop_assume!(polyline.arc_length() >= DEGENERATE_LENGTH);

        let knots = ArcLengthResampler::new(n).resample(&points).unwrap();
        let mut segment = 0;
        let mut previous = 0.0;
        for knot in &knots {
            let found = arc_position_from(&polyline, knot, segment);
            prop_assert!(found.is_some(), "knot {:?} is off the path", knot);
            let (index, arc) = found.unwrap();
            prop_assert!(arc >= previous - 1e-9, "arc {} after {}", arc, previous);
            segment = index;
            previous = arc;
        }
        prop_assert!((previous - polyline.arc_length()).abs() < 1e-9);
    }
}

// =============================================================================
// Properties: Spline
// =============================================================================

proptest! {
    /// The spline interpolates its knots.
    #[test]
    fn spline_passes_through_knots(points in arb_recording(20)) {
        let spline = SmoothSpline::through_knots(&points).unwrap();
        for (i, p) in points.iter().enumerate() {
            let t = spline.knot_parameter(i).unwrap();
            prop_assert!((spline.point_at(t) - p).norm() < 1e-9);
        }
    }

    /// The sampled nearest distance never beats the refined one, and both
    /// are bounded by the distance to the start point.
    #[test]
    fn nearest_distance_bounds(points in arb_recording(10), query in arb_position()) {
        let spline = SmoothSpline::through_knots(&points).unwrap();
        let sampled = spline.nearest_point(&query, NearestPointMethod::default());
        let refined = spline.nearest_point(&query, NearestPointMethod::refined());

        prop_assert!(sampled.distance >= 0.0);
        prop_assert!(refined.distance <= sampled.distance);
        prop_assert!(sampled.distance <= (spline.start() - query).norm() + 1e-12);
    }
}
