//! Attendance confirmation repository for JSON storage
//!
//! Confirmations live in confirmations.json. At most one confirmation exists
//! per (session, subject) pair, across every process sharing the file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TeamsheetError;

use super::file_io::{read_json, write_json_atomic, StoreLock};

/// A recorded attendance confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceConfirmation {
    pub organization_id: String,
    pub session_id: String,
    pub subject_id: String,
    pub confirmed_at: DateTime<Utc>,
}

impl AttendanceConfirmation {
    /// Identifier used for audit entries, `{session}:{subject}`
    pub fn entity_id(&self) -> String {
        format!("{}:{}", self.session_id, self.subject_id)
    }

    fn key(&self) -> ConfirmationKey {
        (self.session_id.clone(), self.subject_id.clone())
    }
}

/// Serializable confirmation data structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfirmationData {
    confirmations: Vec<AttendanceConfirmation>,
}

type ConfirmationKey = (String, String);
type ConfirmationMap = HashMap<ConfirmationKey, AttendanceConfirmation>;

/// Repository for attendance confirmation persistence
///
/// Reads are served from the snapshot taken by the last `load` or
/// `insert_new`. Every write goes through `insert_new`, which holds the
/// store's file lock while it reloads, checks and persists.
pub struct ConfirmationStore {
    path: PathBuf,
    data: RwLock<ConfirmationMap>,
}

impl ConfirmationStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read_file(&self) -> Result<ConfirmationMap, TeamsheetError> {
        let file_data: ConfirmationData = read_json(&self.path)?;
        Ok(file_data
            .confirmations
            .into_iter()
            .map(|c| (c.key(), c))
            .collect())
    }

    fn write_file(&self, data: &ConfirmationMap) -> Result<(), TeamsheetError> {
        let mut confirmations: Vec<_> = data.values().cloned().collect();
        confirmations.sort_by(|a, b| {
            a.confirmed_at
                .cmp(&b.confirmed_at)
                .then_with(|| a.entity_id().cmp(&b.entity_id()))
        });

        write_json_atomic(&self.path, &ConfirmationData { confirmations })
    }

    /// Load confirmations from disk
    pub fn load(&self) -> Result<(), TeamsheetError> {
        let on_disk = self.read_file()?;

        let mut data = self.data.write().map_err(|e| {
            TeamsheetError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *data = on_disk;

        Ok(())
    }

    /// Get the confirmation for a session and subject
    pub fn get(
        &self,
        session_id: &str,
        subject_id: &str,
    ) -> Result<Option<AttendanceConfirmation>, TeamsheetError> {
        let data = self.data.read().map_err(|e| {
            TeamsheetError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data
            .get(&(session_id.to_string(), subject_id.to_string()))
            .cloned())
    }

    /// Get all confirmations for a session, earliest first
    pub fn get_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<AttendanceConfirmation>, TeamsheetError> {
        let data = self.data.read().map_err(|e| {
            TeamsheetError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut confirmations: Vec<_> = data
            .values()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect();
        confirmations.sort_by(|a, b| a.confirmed_at.cmp(&b.confirmed_at));
        Ok(confirmations)
    }

    /// Record and persist a confirmation unless the pair is already confirmed
    ///
    /// Under the file lock the store is reloaded from disk, checked, and
    /// written back. Returns `AlreadyConfirmed` when the pair exists on disk.
    /// If the write fails nothing is recorded, in memory or on disk.
    pub fn insert_new(&self, confirmation: AttendanceConfirmation) -> Result<(), TeamsheetError> {
        let _file_lock = StoreLock::acquire(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            TeamsheetError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut latest = self.read_file()?;
        let key = confirmation.key();
        if latest.contains_key(&key) {
            *data = latest;
            return Err(TeamsheetError::AlreadyConfirmed {
                session_id: key.0,
                subject_id: key.1,
            });
        }

        latest.insert(key, confirmation);
        self.write_file(&latest)?;
        *data = latest;

        Ok(())
    }

    pub fn count(&self) -> Result<usize, TeamsheetError> {
        let data = self.data.read().map_err(|e| {
            TeamsheetError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.len())
    }
}
