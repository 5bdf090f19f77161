//! Error types for tube tracking and haptic feedback.

use thiserror::Error;

/// Errors raised while configuring feedback.
///
/// Per-frame updates never fail: a missing tube or target yields an idle
/// update instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedbackError {
    /// A configuration value is out of range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A tube radius is not a positive finite number.
    #[error("invalid tube radius: {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// A digit channel index is outside `0..=5`.
    #[error("digit channel {index} out of range (0..=5)")]
    InvalidDigit {
        /// The rejected index.
        index: u8,
    },
}

impl FeedbackError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

/// Result type for feedback operations.
pub type Result<T> = std::result::Result<T, FeedbackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedbackError::invalid_config("hard_factor", "must be >= soft_factor");
        assert!(err.to_string().contains("hard_factor"));
        assert!(err.is_config());

        let err = FeedbackError::InvalidRadius { radius: -0.5 };
        assert!(err.to_string().contains("-0.5"));
        assert!(!err.is_config());
    }
}
