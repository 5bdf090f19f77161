//! Curve geometry for recorded hand trajectories.
//!
//! A therapist demonstrates a movement; the recording is a dense, unevenly
//! spaced polyline. This crate turns it into the smooth guide curve the
//! patient follows:
//!
//! - [`Polyline`] - The raw recording as a piecewise linear curve
//! - [`ArcLengthResampler`] - Reduces a recording to a fixed number of knots
//!   equally spaced along its length
//! - [`SmoothSpline`] - C1 cubic spline passing through every knot
//! - [`nearest_point`] - Distance from a tracked position to any [`Curve`]
//!
//! # Example
//!
//! ```
//! use trajectory_curve::{ArcLengthResampler, Curve, NearestPointMethod, SmoothSpline};
//! use nalgebra::Point3;
//!
//! let recorded: Vec<_> = (0..50)
//!     .map(|i| {
//!         let x = f64::from(i) * 0.01;
//!         Point3::new(x, (x * 6.0).sin() * 0.1, 0.0)
//!     })
//!     .collect();
//!
//! let knots = ArcLengthResampler::default().resample(&recorded).unwrap();
//! let spline = SmoothSpline::through_knots(&knots).unwrap();
//!
//! let hit = spline.nearest_point(&Point3::new(0.2, 0.3, 0.0), NearestPointMethod::default());
//! assert!(hit.distance > 0.0);
//! assert!(spline.arc_length() > 0.49);
//! ```
//!
//! # Coordinate System
//!
//! Positions are metres in the tracking space of the headset. No axis
//! convention is assumed.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for all types

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::suboptimal_flops,
    clippy::while_float,
    clippy::missing_const_for_fn,
    clippy::cast_lossless,
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    clippy::missing_panics_doc,
    clippy::manual_midpoint,
    clippy::imprecise_flops
)]

mod error;
mod nearest;
mod polyline;
mod resample;
mod spline;
mod traits;

pub use error::CurveError;
pub use nearest::{
    DEFAULT_REFINE_TOLERANCE, DEFAULT_SCAN_STEPS, NearestPoint, NearestPointMethod, nearest_point,
};
pub use polyline::{Polyline, compute_cumulative_lengths};
pub use resample::{ArcLengthResampler, DEFAULT_KNOT_COUNT, DEGENERATE_LENGTH, arc_positions};
pub use spline::{CubicSegment, Knot, SmoothSpline, TangentMode};
pub use traits::Curve;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
