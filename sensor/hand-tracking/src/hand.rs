//! Tracked hand poses.

use nalgebra::{Point3, UnitQuaternion};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Handedness {
    /// Left hand.
    Left,
    /// Right hand.
    Right,
}

impl Handedness {
    /// Both hands, left first.
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The other hand.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finger, ordered thumb to pinky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Finger {
    /// Thumb.
    Thumb,
    /// Index finger.
    Index,
    /// Middle finger.
    Middle,
    /// Ring finger.
    Ring,
    /// Little finger.
    Pinky,
}

impl Finger {
    /// All fingers in index order.
    pub const ALL: [Self; 5] = [Self::Thumb, Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// Index into a fingertip array (0 = thumb .. 4 = pinky).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A tracked hand at one instant: palm pose plus fingertip positions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HandPose {
    /// Which hand this is.
    pub side: Handedness,
    /// Palm centre.
    pub palm: Point3<f64>,
    /// Palm orientation.
    pub orientation: UnitQuaternion<f64>,
    /// Fingertip positions indexed by [`Finger::index`].
    pub fingertips: [Point3<f64>; 5],
}

impl HandPose {
    /// A pose with every fingertip collapsed onto the palm.
    #[must_use]
    pub fn at_palm(side: Handedness, palm: Point3<f64>) -> Self {
        Self {
            side,
            palm,
            orientation: UnitQuaternion::identity(),
            fingertips: [palm; 5],
        }
    }

    /// Position of one fingertip.
    #[must_use]
    pub const fn fingertip(&self, finger: Finger) -> Point3<f64> {
        self.fingertips[finger.index()]
    }

    /// True when every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let finite = |p: &Point3<f64>| p.coords.iter().all(|c| c.is_finite());
        finite(&self.palm) && self.fingertips.iter().all(finite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finger_indices() {
        for (i, finger) in Finger::ALL.iter().enumerate() {
            assert_eq!(finger.index(), i);
        }
    }

    #[test]
    fn test_handedness() {
        assert_eq!(Handedness::Left.opposite(), Handedness::Right);
        assert_eq!(Handedness::Right.to_string(), "right");
    }

    #[test]
    fn test_pose_finiteness() {
        let mut pose = HandPose::at_palm(Handedness::Left, Point3::new(0.1, 0.2, 0.3));
        assert!(pose.is_finite());
        assert_eq!(pose.fingertip(Finger::Ring), pose.palm);

        pose.fingertips[Finger::Index.index()].x = f64::NAN;
        assert!(!pose.is_finite());
    }
}
