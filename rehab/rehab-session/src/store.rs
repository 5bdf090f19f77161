//! Persistent records and the document store interface.
//!
//! The store is an opaque document database keyed by patient. Each patient
//! has a small counter document plus two collections, trajectories and
//! sessions. Ids are generated by the caller (see [`session_id`](crate::session_id)) so writes
//! are idempotent: writing the same id twice overwrites one document.

use crate::error::{Result, SessionError, StoreResult};
use chrono::{DateTime, Utc};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use trajectory_curve::CurveError;
use tube_feedback::round_to_mm;

use crate::scorer::SessionMetrics;

/// A stored point, `{x, y, z}` in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl From<Point3<f64>> for PointRecord {
    fn from(p: Point3<f64>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<PointRecord> for Point3<f64> {
    fn from(p: PointRecord) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// A therapist-recorded guide trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    /// Recorded points in order.
    pub points: Vec<PointRecord>,
    /// Tube radius in metres, rounded to millimetres. Older records may
    /// lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Number of points at recording time.
    pub point_count: usize,
    /// When the trajectory was saved.
    pub recorded_at: DateTime<Utc>,
}

impl TrajectoryRecord {
    /// Build a record from recorded points.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InsufficientPoints`] for fewer than two
    /// points and [`CurveError::NonFinitePoint`] for NaN or infinite
    /// coordinates.
    pub fn new(points: &[Point3<f64>], radius: f64, recorded_at: DateTime<Utc>) -> Result<Self> {
        if points.len() < 2 {
            return Err(SessionError::insufficient_points(2, points.len()));
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(CurveError::NonFinitePoint { index }.into());
        }
        Ok(Self {
            points: points.iter().copied().map(PointRecord::from).collect(),
            radius: Some(round_to_mm(radius)),
            point_count: points.len(),
            recorded_at,
        })
    }

    /// The points as positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().copied().map(Point3::from).collect()
    }
}

/// A completed play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When the session was completed.
    pub completed_at: DateTime<Utc>,
    /// Guide trajectory that was played.
    pub trajectory_id: String,
    /// 1-based session ordinal for the patient.
    pub session_number: u32,
    /// Hand that held the object: `"none"`, `"left"` or `"right"`.
    pub hand: String,
    /// Scoring results.
    #[serde(flatten)]
    pub metrics: SessionMetrics,
}

/// Per-patient counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    /// Sessions completed so far.
    pub completed_sessions: u32,
    /// Trajectories recorded so far.
    pub completed_trajectories: u32,
}

/// Document database used for trajectories and sessions.
///
/// Reads of a missing document return `Ok(None)`; only real failures are
/// errors. Counter reads for an unknown patient return zero.
pub trait DocumentStore {
    /// Read a trajectory.
    fn read_trajectory(
        &self,
        patient_id: &str,
        trajectory_id: &str,
    ) -> StoreResult<Option<TrajectoryRecord>>;

    /// Write (or overwrite) a trajectory.
    fn write_trajectory(
        &mut self,
        patient_id: &str,
        trajectory_id: &str,
        record: &TrajectoryRecord,
    ) -> StoreResult<()>;

    /// Ids of every stored trajectory for a patient, sorted.
    fn list_trajectories(&self, patient_id: &str) -> StoreResult<Vec<String>>;

    /// Read a session.
    fn read_session(&self, patient_id: &str, session_id: &str)
    -> StoreResult<Option<SessionRecord>>;

    /// Write (or overwrite) a session.
    fn write_session(
        &mut self,
        patient_id: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> StoreResult<()>;

    /// The patient's counter document.
    fn patient(&self, patient_id: &str) -> StoreResult<PatientRecord>;

    /// Replace the patient's counter document.
    fn write_patient(&mut self, patient_id: &str, record: &PatientRecord) -> StoreResult<()>;

    /// Sessions the patient has completed.
    fn completed_sessions(&self, patient_id: &str) -> StoreResult<u32> {
        Ok(self.patient(patient_id)?.completed_sessions)
    }

    /// Set the completed-session counter.
    fn set_completed_sessions(&mut self, patient_id: &str, count: u32) -> StoreResult<()> {
        let mut record = self.patient(patient_id)?;
        record.completed_sessions = count;
        self.write_patient(patient_id, &record)
    }

    /// Trajectories the patient has recorded.
    fn completed_trajectories(&self, patient_id: &str) -> StoreResult<u32> {
        Ok(self.patient(patient_id)?.completed_trajectories)
    }

    /// Set the recorded-trajectory counter.
    fn set_completed_trajectories(&mut self, patient_id: &str, count: u32) -> StoreResult<()> {
        let mut record = self.patient(patient_id)?;
        record.completed_trajectories = count;
        self.write_patient(patient_id, &record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_record_rounds_radius() {
        let points = [Point3::origin(), Point3::new(0.1, 0.0, 0.0)];
        let record = TrajectoryRecord::new(&points, 0.0534, Utc::now());
        let record = record.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(record.radius, Some(0.053));
        assert_eq!(record.point_count, 2);
        assert_eq!(record.positions(), points.to_vec());
    }

    #[test]
    fn test_trajectory_record_needs_two_points() {
        let err = TrajectoryRecord::new(&[Point3::origin()], 0.05, Utc::now());
        assert!(matches!(
            err,
            Err(SessionError::InsufficientPoints {
                required: 2,
                actual: 1
            })
        ));

        let err = TrajectoryRecord::new(
            &[Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)],
            0.05,
            Utc::now(),
        );
        assert!(matches!(
            err,
            Err(SessionError::Curve(CurveError::NonFinitePoint { index: 1 }))
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_session_record_json_is_flat() {
        let record = SessionRecord {
            completed_at: Utc::now(),
            trajectory_id: "Trajectory001-010125".to_string(),
            session_number: 3,
            hand: "left".to_string(),
            metrics: SessionMetrics {
                total_errors: 4,
                total_time: 30.0,
                time_outside: 3.0,
                inside_percentage: 90.0,
                radius: 0.05,
                stars: 5,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["total_errors"], 4);
        assert_eq!(json["stars"], 5);
        assert_eq!(json["hand"], "left");

        let back: SessionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_old_trajectory_without_radius() {
        let json = r#"{
            "points": [{"x": 0.0, "y": 0.0, "z": 0.0}, {"x": 1.0, "y": 0.0, "z": 0.0}],
            "point_count": 2,
            "recorded_at": "2024-05-01T10:00:00Z"
        }"#;
        let record: TrajectoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.radius, None);
        assert_eq!(record.positions().len(), 2);
    }
}
