//! Document store backed by a directory of JSON files.
//!
//! Layout:
//!
//! ```text
//! <root>/<patient>/patient.json
//! <root>/<patient>/trajectories/<id>.json
//! <root>/<patient>/sessions/<id>.json
//! ```
//!
//! Each write goes to a temporary sibling first and is renamed into place,
//! so readers never see a half-written document.

use crate::error::{StoreError, StoreResult};
use crate::ids::is_valid_id;
use crate::store::{DocumentStore, PatientRecord, SessionRecord, TrajectoryRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const TRAJECTORIES: &str = "trajectories";
const SESSIONS: &str = "sessions";
const PATIENT_FILE: &str = "patient.json";

/// A [`DocumentStore`] writing one JSON file per document.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn patient_dir(&self, patient_id: &str) -> StoreResult<PathBuf> {
        check_id(patient_id)?;
        Ok(self.root.join(patient_id))
    }

    fn doc_path(&self, patient_id: &str, collection: &str, id: &str) -> StoreResult<PathBuf> {
        check_id(id)?;
        Ok(self
            .patient_dir(patient_id)?
            .join(collection)
            .join(format!("{id}.json")))
    }
}

fn check_id(id: &str) -> StoreResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId { id: id.to_string() })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "document written");
    Ok(())
}

impl DocumentStore for JsonDirStore {
    fn read_trajectory(
        &self,
        patient_id: &str,
        trajectory_id: &str,
    ) -> StoreResult<Option<TrajectoryRecord>> {
        read_json(&self.doc_path(patient_id, TRAJECTORIES, trajectory_id)?)
    }

    fn write_trajectory(
        &mut self,
        patient_id: &str,
        trajectory_id: &str,
        record: &TrajectoryRecord,
    ) -> StoreResult<()> {
        write_json(&self.doc_path(patient_id, TRAJECTORIES, trajectory_id)?, record)
    }

    fn list_trajectories(&self, patient_id: &str) -> StoreResult<Vec<String>> {
        let dir = self.patient_dir(patient_id)?.join(TRAJECTORIES);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_session(
        &self,
        patient_id: &str,
        session_id: &str,
    ) -> StoreResult<Option<SessionRecord>> {
        read_json(&self.doc_path(patient_id, SESSIONS, session_id)?)
    }

    fn write_session(
        &mut self,
        patient_id: &str,
        session_id: &str,
        record: &SessionRecord,
    ) -> StoreResult<()> {
        write_json(&self.doc_path(patient_id, SESSIONS, session_id)?, record)
    }

    fn patient(&self, patient_id: &str) -> StoreResult<PatientRecord> {
        let path = self.patient_dir(patient_id)?.join(PATIENT_FILE);
        Ok(read_json(&path)?.unwrap_or_default())
    }

    fn write_patient(&mut self, patient_id: &str, record: &PatientRecord) -> StoreResult<()> {
        write_json(&self.patient_dir(patient_id)?.join(PATIENT_FILE), record)
    }
}
