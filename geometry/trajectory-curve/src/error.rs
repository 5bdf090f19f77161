//! Error types for curve construction.

use thiserror::Error;

/// Errors that can occur while building curves from recorded points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// Insufficient points to define the curve.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// A point has a NaN or infinite coordinate.
    #[error("non-finite coordinate at index {index}")]
    NonFinitePoint {
        /// Index of the offending point.
        index: usize,
    },

    /// Degenerate curve (e.g., zero length).
    #[error("degenerate curve: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },
}

impl CurveError {
    /// Create an insufficient points error.
    #[must_use]
    pub const fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Create a degenerate curve error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    /// Check if this is an insufficient points error.
    #[must_use]
    pub const fn is_insufficient_points(&self) -> bool {
        matches!(self, Self::InsufficientPoints { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::insufficient_points(2, 1);
        assert!(err.to_string().contains("need at least 2"));
        assert!(err.to_string().contains("got 1"));

        let err = CurveError::NonFinitePoint { index: 7 };
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_error_predicates() {
        assert!(CurveError::insufficient_points(2, 0).is_insufficient_points());
        assert!(!CurveError::degenerate("zero length").is_insufficient_points());
    }
}
