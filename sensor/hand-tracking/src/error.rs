//! Error types for hand-tracking input.

use thiserror::Error;

/// Errors raised while configuring or driving trajectory capture.
///
/// A tracked position that is not yet valid is not an error; the sampler and
/// readiness poll report it as a state instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackingError {
    /// A configuration value is out of range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A position has a NaN or infinite coordinate.
    #[error("non-finite position: ({x}, {y}, {z})")]
    NonFinitePosition {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Z coordinate.
        z: f64,
    },

    /// The operation needs an active recording.
    #[error("no recording in progress")]
    NotRecording,
}

impl TrackingError {
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

/// Result type for hand-tracking operations.
pub type Result<T> = std::result::Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackingError::invalid_config("interval", "must be positive");
        assert!(err.to_string().contains("interval"));
        assert!(err.to_string().contains("must be positive"));
        assert!(err.is_config());

        assert!(!TrackingError::NotRecording.is_config());
        assert!(TrackingError::NotRecording.to_string().contains("recording"));
    }
}
