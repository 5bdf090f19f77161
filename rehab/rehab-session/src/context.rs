//! Explicit session context.
//!
//! Who is playing, which trajectory and which session number. Passed into
//! every persisting call instead of living in shared global state.

use crate::error::StoreResult;
use crate::ids::session_id;
use crate::store::DocumentStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Correlation keys for one play session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
    /// Patient document id.
    pub patient_id: String,
    /// Session document id.
    pub session_id: String,
    /// Guide trajectory document id.
    pub trajectory_id: String,
    /// 1-based session ordinal for the patient.
    pub session_number: u32,
}

impl SessionContext {
    /// Context for session `session_number` played on `date`.
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        trajectory_id: impl Into<String>,
        session_number: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            session_id: session_id(session_number, date),
            trajectory_id: trajectory_id.into(),
            session_number,
        }
    }

    /// Context for the patient's next session: completed sessions + 1.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rehab_session::{DocumentStore, MemoryStore, SessionContext};
    ///
    /// let mut store = MemoryStore::new();
    /// store.set_completed_sessions("px01", 2).unwrap();
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
    /// let ctx = SessionContext::next_session(&store, "px01", "Trajectory001-080125", date).unwrap();
    /// assert_eq!(ctx.session_number, 3);
    /// assert_eq!(ctx.session_id, "Session003-090125");
    /// ```
    pub fn next_session<S: DocumentStore + ?Sized>(
        store: &S,
        patient_id: &str,
        trajectory_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Self> {
        let completed = store.completed_sessions(patient_id)?;
        Ok(Self::new(
            patient_id,
            trajectory_id,
            completed.saturating_add(1),
            date,
        ))
    }
}
