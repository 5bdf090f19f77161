//! Core curve trait.

use nalgebra::{Point3, Vector3};

/// A parametric curve in 3D space.
///
/// All curves are parameterized over `t ∈ [0, 1]`, where `t=0` is the start
/// and `t=1` is the end of the curve.
///
/// # Implementors
///
/// - [`Polyline`](crate::Polyline) - Piecewise linear, as recorded
/// - [`SmoothSpline`](crate::SmoothSpline) - Auto-smooth cubic spline through knots
pub trait Curve {
    /// Evaluate the curve position at parameter `t ∈ [0, 1]`.
    ///
    /// Out-of-range parameters are clamped.
    fn point_at(&self, t: f64) -> Point3<f64>;

    /// Compute the first derivative (velocity) at parameter `t`.
    fn derivative_at(&self, t: f64) -> Vector3<f64>;

    /// Compute the unit tangent vector at parameter `t`.
    ///
    /// Falls back to +X where the derivative vanishes.
    fn tangent_at(&self, t: f64) -> Vector3<f64> {
        let d = self.derivative_at(t);
        let norm = d.norm();
        if norm > 1e-10 { d / norm } else { Vector3::x() }
    }

    /// Compute the total arc length of the curve.
    ///
    /// The default integrates `|C'(t)|` with adaptive Simpson quadrature.
    fn arc_length(&self) -> f64 {
        adaptive_arc_length(self, 0.0, 1.0, 1e-10, 20)
    }

    /// Sample the curve at uniform parameter intervals.
    ///
    /// Returns `n` points (at least 2) evenly spaced in parameter space.
    fn sample_uniform(&self, n: usize) -> Vec<Point3<f64>> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                self.point_at(t)
            })
            .collect()
    }

    /// Get the start point of the curve (`t=0`).
    fn start(&self) -> Point3<f64> {
        self.point_at(0.0)
    }

    /// Get the end point of the curve (`t=1`).
    fn end(&self) -> Point3<f64> {
        self.point_at(1.0)
    }

    /// Compute the bounding box of the curve.
    ///
    /// Returns `(min, max)` corners of the axis-aligned bounding box, using
    /// a 100-sample approximation.
    fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let samples = self.sample_uniform(100);
        let mut min = samples[0];
        let mut max = samples[0];

        for p in &samples[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }

        (min, max)
    }
}

/// Adaptive Simpson's rule for arc length integration.
pub(crate) fn adaptive_arc_length<C: Curve + ?Sized>(
    curve: &C,
    a: f64,
    b: f64,
    tolerance: f64,
    max_depth: usize,
) -> f64 {
    fn simpson_step<C: Curve + ?Sized>(curve: &C, a: f64, b: f64) -> f64 {
        let mid = (a + b) / 2.0;
        let h = (b - a) / 6.0;

        let fa = curve.derivative_at(a).norm();
        let fm = curve.derivative_at(mid).norm();
        let fb = curve.derivative_at(b).norm();

        h * (fa + 4.0 * fm + fb)
    }

    fn adaptive_helper<C: Curve + ?Sized>(
        curve: &C,
        a: f64,
        b: f64,
        tolerance: f64,
        whole: f64,
        depth: usize,
    ) -> f64 {
        let mid = (a + b) / 2.0;
        let left = simpson_step(curve, a, mid);
        let right = simpson_step(curve, mid, b);
        let combined = left + right;

        if depth == 0 || (combined - whole).abs() < 15.0 * tolerance {
            combined + (combined - whole) / 15.0
        } else {
            let new_tol = tolerance / 2.0;
            adaptive_helper(curve, a, mid, new_tol, left, depth - 1)
                + adaptive_helper(curve, mid, b, new_tol, right, depth - 1)
        }
    }

    let whole = simpson_step(curve, a, b);
    adaptive_helper(curve, a, b, tolerance, whole, max_depth)
}
