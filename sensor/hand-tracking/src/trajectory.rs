//! Recorded trajectories.

use nalgebra::Point3;
use trajectory_curve::{CurveError, Polyline, compute_cumulative_lengths};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered world-space points in recording order.
///
/// Points are only ever appended while recording. Once handed out by
/// [`Sampler::stop`](crate::Sampler::stop) the trajectory is a snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawTrajectory {
    points: Vec<Point3<f64>>,
}

impl RawTrajectory {
    /// An empty trajectory.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Wrap existing points (for example, loaded from storage).
    #[must_use]
    pub const fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub(crate) fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }

    /// The recorded points.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Most recent point.
    #[must_use]
    pub fn last(&self) -> Option<&Point3<f64>> {
        self.points.last()
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total path length in metres.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        compute_cumulative_lengths(&self.points).1
    }

    /// View as a polyline.
    ///
    /// # Errors
    ///
    /// Fails with fewer than 2 points.
    pub fn to_polyline(&self) -> Result<Polyline, CurveError> {
        Polyline::try_new(self.points.clone())
    }

    /// Take the points out.
    #[must_use]
    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arc_length() {
        let traj = RawTrajectory::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.3, 0.0, 0.0),
            Point3::new(0.3, 0.4, 0.0),
        ]);
        assert_relative_eq!(traj.arc_length(), 0.7, epsilon = 1e-12);
        assert_eq!(traj.len(), 3);
        assert!(traj.to_polyline().is_ok());
    }

    #[test]
    fn test_single_point_has_no_polyline() {
        let traj = RawTrajectory::from_points(vec![Point3::origin()]);
        assert_relative_eq!(traj.arc_length(), 0.0);
        assert!(traj.to_polyline().unwrap_err().is_insufficient_points());
    }
}
