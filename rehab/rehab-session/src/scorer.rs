//! Session scoring.
//!
//! The star ladder is nested: every bonus requires all the previous ones,
//! and at each level the inside-percentage check comes before the error
//! check.
//!
//! | Stars | Requires |
//! |---|---|
//! | 1 | nothing |
//! | 2 | inside % >= `t_min` |
//! | 3 | and errors <= `error_threshold` |
//! | 4 | and inside % >= `t_min + 20` |
//! | 5 | and errors <= `error_threshold - 3` |

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default inside-percentage threshold for the second star.
pub const DEFAULT_T_MIN: f64 = 50.0;

/// Default error threshold for the third star.
pub const DEFAULT_ERROR_THRESHOLD: u32 = 6;

/// Extra inside percentage required for the fourth star.
pub const T_MIN_STEP: f64 = 20.0;

/// How many fewer errors the fifth star allows.
pub const ERROR_STEP: u32 = 3;

/// Star ladder thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    /// Inside percentage for the second star.
    pub t_min: f64,
    /// Maximum errors for the third star.
    pub error_threshold: u32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            t_min: DEFAULT_T_MIN,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

impl ScoreThresholds {
    /// Set the inside-percentage threshold.
    #[must_use]
    pub const fn with_t_min(mut self, t_min: f64) -> Self {
        self.t_min = t_min;
        self
    }

    /// Set the error threshold.
    #[must_use]
    pub const fn with_error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }

    /// Star rating for a session.
    ///
    /// # Example
    ///
    /// ```
    /// use rehab_session::ScoreThresholds;
    ///
    /// let thresholds = ScoreThresholds::default();
    /// assert_eq!(thresholds.stars(60.0, 5), 3);
    /// assert_eq!(thresholds.stars(80.0, 2), 5);
    /// assert_eq!(thresholds.stars(40.0, 0), 1);
    /// ```
    #[must_use]
    pub fn stars(&self, inside_percentage: f64, total_errors: u32) -> u8 {
        let errors = i64::from(total_errors);
        let threshold = i64::from(self.error_threshold);

        let mut stars = 1;
        if inside_percentage >= self.t_min {
            stars += 1;
            if errors <= threshold {
                stars += 1;
                if inside_percentage >= self.t_min + T_MIN_STEP {
                    stars += 1;
                    if errors <= threshold - i64::from(ERROR_STEP) {
                        stars += 1;
                    }
                }
            }
        }
        stars
    }
}

/// Share of `total_time` spent inside the tube, in percent.
///
/// Zero when no time has passed. The result is clamped to `[0, 100]`.
#[must_use]
pub fn inside_percentage(total_time: f64, time_outside: f64) -> f64 {
    if !(total_time.is_finite() && total_time > 0.0) {
        return 0.0;
    }
    let outside = if time_outside.is_finite() {
        time_outside
    } else {
        0.0
    };
    ((total_time - outside) / total_time * 100.0).clamp(0.0, 100.0)
}

/// Frozen results of one session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Tube exits over the whole session.
    pub total_errors: u32,
    /// Seconds from grab to completion.
    pub total_time: f64,
    /// Seconds spent outside the tube.
    pub time_outside: f64,
    /// Percent of `total_time` inside the tube.
    pub inside_percentage: f64,
    /// Tube radius at completion.
    pub radius: f64,
    /// Star rating, 1 to 5.
    pub stars: u8,
}

/// Computes [`SessionMetrics`] once per session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionScorer {
    thresholds: ScoreThresholds,
    completed: Option<SessionMetrics>,
}

impl SessionScorer {
    /// A scorer with no result yet.
    #[must_use]
    pub const fn new(thresholds: ScoreThresholds) -> Self {
        Self {
            thresholds,
            completed: None,
        }
    }

    /// The ladder thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &ScoreThresholds {
        &self.thresholds
    }

    /// True once metrics have been computed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    /// The frozen metrics, if computed.
    #[must_use]
    pub const fn metrics(&self) -> Option<&SessionMetrics> {
        self.completed.as_ref()
    }

    /// Compute and freeze the session metrics.
    ///
    /// Once the metrics exist, further calls return them unchanged whatever
    /// the arguments.
    pub fn compute(
        &mut self,
        time_outside: f64,
        total_time: f64,
        total_errors: u32,
        radius: f64,
    ) -> SessionMetrics {
        if let Some(metrics) = self.completed {
            debug!("session already scored, keeping frozen metrics");
            return metrics;
        }

        let total_time = if total_time.is_finite() {
            total_time.max(0.0)
        } else {
            0.0
        };
        let time_outside = if time_outside.is_finite() {
            time_outside.clamp(0.0, total_time)
        } else {
            0.0
        };
        let inside_percentage = inside_percentage(total_time, time_outside);
        let metrics = SessionMetrics {
            total_errors,
            total_time,
            time_outside,
            inside_percentage,
            radius,
            stars: self.thresholds.stars(inside_percentage, total_errors),
        };
        info!(
            errors = metrics.total_errors,
            total_time = metrics.total_time,
            inside_percentage = metrics.inside_percentage,
            stars = metrics.stars,
            "session scored"
        );
        self.completed = Some(metrics);
        metrics
    }

    /// Forget the result for a new session.
    pub fn reset(&mut self) {
        self.completed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ladder_examples() {
        let t = ScoreThresholds::default();
        // 60 >= 50, 5 <= 6, 60 < 70
        assert_eq!(t.stars(60.0, 5), 3);
        // every tier passes
        assert_eq!(t.stars(80.0, 2), 5);
    }

    #[test]
    fn test_ladder_is_nested() {
        let t = ScoreThresholds::default();
        // Few errors are worth nothing below t_min
        assert_eq!(t.stars(49.9, 0), 1);
        // High percentage is capped by the error tier
        assert_eq!(t.stars(95.0, 7), 2);
        assert_eq!(t.stars(95.0, 4), 4);
        assert_eq!(t.stars(70.0, 3), 5);
        assert_eq!(t.stars(69.9, 0), 3);
    }

    #[test]
    fn test_small_error_threshold_never_underflows() {
        let t = ScoreThresholds::default().with_error_threshold(2);
        // 2 - 3 < 0 so the fifth star is unreachable
        assert_eq!(t.stars(100.0, 0), 4);
    }

    #[test]
    fn test_inside_percentage() {
        assert_relative_eq!(inside_percentage(10.0, 4.0), 60.0);
        assert_relative_eq!(inside_percentage(0.0, 0.0), 0.0);
        assert_relative_eq!(inside_percentage(f64::NAN, 1.0), 0.0);
        assert_relative_eq!(inside_percentage(10.0, 12.0), 0.0);
    }

    #[test]
    fn test_compute_is_frozen() {
        let mut scorer = SessionScorer::new(ScoreThresholds::default());
        let first = scorer.compute(4.0, 10.0, 5, 0.05);
        assert_eq!(first.stars, 3);
        assert_relative_eq!(first.inside_percentage, 60.0);
        assert!(scorer.is_complete());

        let second = scorer.compute(0.0, 100.0, 0, 0.2);
        assert_eq!(second, first);
        assert_eq!(scorer.metrics(), Some(&first));

        scorer.reset();
        assert_eq!(scorer.compute(0.0, 100.0, 0, 0.2).stars, 5);
    }
}
