//! Error types for sessions and document stores.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed patient has no document.
    #[error("patient not found: {patient_id}")]
    PatientNotFound {
        /// The missing patient.
        patient_id: String,
    },

    /// An id cannot be used as a document key.
    #[error("invalid document id `{id}`")]
    InvalidId {
        /// The rejected id.
        id: String,
    },

    /// The store refused the operation (offline, read-only, ...).
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Why the store refused.
        reason: String,
    },

    /// A stored document could not be decoded.
    #[error("corrupt document at {path}: {source}")]
    Corrupt {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates an unavailable-store error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Io(_))
    }
}

/// Errors raised by session operations.
///
/// Per-frame calls never return these; only recording, curve building,
/// configuration and persistence do.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Not enough points for the requested operation.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Points available.
        actual: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`RehabConfig`](crate::RehabConfig).
    #[error("cannot parse config {path}: {source}")]
    ConfigParse {
        /// Config path.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Curve construction failed.
    #[error(transparent)]
    Curve(#[from] trajectory_curve::CurveError),

    /// Recording failed.
    #[error(transparent)]
    Recording(#[from] hand_tracking::TrackingError),

    /// Tube or haptic setup failed.
    #[error(transparent)]
    Feedback(#[from] tube_feedback::FeedbackError),

    /// The document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Creates an insufficient points error.
    #[must_use]
    pub const fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true for any flavour of "not enough points".
    #[must_use]
    pub const fn is_insufficient_points(&self) -> bool {
        matches!(
            self,
            Self::InsufficientPoints { .. }
                | Self::Curve(trajectory_curve::CurveError::InsufficientPoints { .. })
        )
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::ConfigRead { .. } | Self::ConfigParse { .. }
        )
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
