//! Position sources.
//!
//! The skeletal tracker is an external subsystem. Anything that can answer
//! "where is the tracked point right now, if known" per tick is a source.

use nalgebra::Point3;

/// Per-tick provider of a tracked 3D position.
///
/// `None` means tracking is not yet valid. Callers treat that as a wait
/// condition, never as an error.
pub trait PositionSource {
    /// Current position, if tracking is valid.
    fn position(&mut self) -> Option<Point3<f64>>;
}

impl<F> PositionSource for F
where
    F: FnMut() -> Option<Point3<f64>>,
{
    fn position(&mut self) -> Option<Point3<f64>> {
        self()
    }
}

/// A fixed position, always valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Point3<f64>);

impl PositionSource for FixedPosition {
    fn position(&mut self) -> Option<Point3<f64>> {
        Some(self.0)
    }
}

/// Replays a recorded sequence, one entry per call.
///
/// After the last entry the source keeps returning it.
///
/// # Example
///
/// ```
/// use hand_tracking::{PositionSource, ScriptedPath};
/// use nalgebra::Point3;
///
/// let mut path = ScriptedPath::new(vec![None, Some(Point3::new(1.0, 0.0, 0.0))]);
/// assert_eq!(path.position(), None);
/// assert_eq!(path.position(), Some(Point3::new(1.0, 0.0, 0.0)));
/// assert_eq!(path.position(), Some(Point3::new(1.0, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedPath {
    frames: Vec<Option<Point3<f64>>>,
    cursor: usize,
}

impl ScriptedPath {
    /// Create a path from per-tick readings.
    #[must_use]
    pub const fn new(frames: Vec<Option<Point3<f64>>>) -> Self {
        Self { frames, cursor: 0 }
    }

    /// A path where every reading is valid.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Self {
        Self::new(points.into_iter().map(Some).collect())
    }

    /// True once every frame has been returned at least once.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.frames.len()
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PositionSource for ScriptedPath {
    fn position(&mut self) -> Option<Point3<f64>> {
        let idx = self.cursor.min(self.frames.len().checked_sub(1)?);
        self.cursor = self.cursor.saturating_add(1);
        self.frames[idx]
    }
}
