//! In-memory document store.

use crate::error::{StoreError, StoreResult};
use crate::ids::is_valid_id;
use crate::store::{DocumentStore, PatientRecord, SessionRecord, TrajectoryRecord};
use hashbrown::HashMap;

#[derive(Debug, Clone, Default)]
struct PatientDocs {
    record: PatientRecord,
    trajectories: HashMap<String, TrajectoryRecord>,
    sessions: HashMap<String, SessionRecord>,
}

/// A [`DocumentStore`] held in hash maps.
///
/// Used for headless runs and tests. [`MemoryStore::set_offline`] makes
/// every write fail, to exercise persistence-failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    patients: HashMap<String, PatientDocs>,
    offline: bool,
    writes: usize,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes fail with [`StoreError::Unavailable`] while `offline`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Number of successful document writes.
    #[must_use]
    pub const fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of stored sessions for a patient.
    #[must_use]
    pub fn session_count(&self, patient_id: &str) -> usize {
        self.patients.get(patient_id).map_or(0, |p| p.sessions.len())
    }

    fn entry(&mut self, patient_id: &str, doc_id: &str) -> StoreResult<&mut PatientDocs> {
        if self.offline {
            return Err(StoreError::unavailable("memory store is offline"));
        }
        for id in [patient_id, doc_id] {
            if !is_valid_id(id) {
                return Err(StoreError::InvalidId { id: id.to_string() });
            }
        }
        self.writes += 1;
        Ok(self.patients.entry(patient_id.to_string()).or_default())
    }
}

impl DocumentStore for MemoryStore {
    fn read_trajectory(
        &self,
        patient_id: &str,
        trajectory_id: &str,
    ) -> StoreResult<Option<TrajectoryRecord>> {
        Ok(self
            .patients
            .get(patient_id)
            .and_then(|p| p.trajectories.get(trajectory_id))
            .cloned())
    }

    fn write_trajectory(
        &mut self,
        patient_id: &str,
        trajectory_id: &str,
        record: &TrajectoryRecord,
    ) -> StoreResult<()> {
        self.entry(patient_id, trajectory_id)?
            .trajectories
            .insert(trajectory_id.to_string(), record.clone());
        Ok(())
    }

    fn list_trajectories(&self, patient_id: &str) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .patients
            .get(patient_id)
            .map(|p| p.trajectories.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    fn read_session(
        &self,
        patient_id: &str,
        session_id: &str,
    ) -> StoreResult<Option<SessionRecord>> {
        Ok(self
            .patients
            .get(patient_id)
            .and_then(|p| p.sessions.get(session_id))
            .cloned())
    }

    fn write_session(
        &mut self,
        patient_id: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> StoreResult<()> {
        self.entry(patient_id, session_id)?
            .sessions
            .insert(session_id.to_string(), record.clone());
        Ok(())
    }

    fn patient(&self, patient_id: &str) -> StoreResult<PatientRecord> {
        Ok(self
            .patients
            .get(patient_id)
            .map(|p| p.record)
            .unwrap_or_default())
    }

    fn write_patient(&mut self, patient_id: &str, record: &PatientRecord) -> StoreResult<()> {
        self.entry(patient_id, patient_id)?.record = *record;
        Ok(())
    }
}
