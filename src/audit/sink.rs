//! Persistence sinks for audit entries
//!
//! A sink only needs to append. It assigns the row id and `created_at`, and
//! never rewrites a row once it is stored.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{TeamsheetError, TeamsheetResult};

use super::entry::{AuditLogEntry, NewAuditEntry};
use super::query::AuditQuery;

/// Append-only store for audit entries
pub trait AuditSink: Send + Sync {
    /// Persist one entry and return the stored row
    fn append(&self, entry: &NewAuditEntry) -> TeamsheetResult<AuditLogEntry>;
}

fn stamp(entry: &NewAuditEntry) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        entry: entry.clone(),
    }
}

/// Writes audit entries to a line-delimited JSON (JSONL) file
///
/// Each line is a complete JSON object for one stored row. Every append
/// opens the file in append mode and flushes before returning.
pub struct JsonlAuditSink {
    log_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditSink {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Read all stored rows in write order (oldest first)
    pub fn read_all(&self) -> TeamsheetResult<Vec<AuditLogEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| TeamsheetError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                TeamsheetError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditLogEntry = serde_json::from_str(&line).map_err(|e| {
                TeamsheetError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// List stored rows matching `query`, newest first
    pub fn query(&self, query: &AuditQuery) -> TeamsheetResult<Vec<AuditLogEntry>> {
        Ok(query.apply(self.read_all()?))
    }

    /// Number of stored rows
    pub fn entry_count(&self) -> TeamsheetResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| TeamsheetError::Io(format!("Failed to open audit log: {}", e)))?;

        let count = BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(count)
    }

    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&self, entry: &NewAuditEntry) -> TeamsheetResult<AuditLogEntry> {
        let stored = stamp(entry);

        let json = serde_json::to_string(&stored)
            .map_err(|e| TeamsheetError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        // One line per write; concurrent appends must not interleave
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| TeamsheetError::Audit("Audit log lock poisoned".to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| TeamsheetError::Io(format!("Failed to open audit log: {}", e)))?;

        // Single write so appends from other processes can't split the line
        let line = format!("{}\n", json);
        file.write_all(line.as_bytes())
            .map_err(|e| TeamsheetError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| TeamsheetError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(stored)
    }
}

/// Keeps audit rows in memory
#[derive(Default)]
pub struct MemoryAuditSink {
    rows: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> TeamsheetResult<MutexGuard<'_, Vec<AuditLogEntry>>> {
        self.rows
            .lock()
            .map_err(|_| TeamsheetError::Audit("Audit store lock poisoned".to_string()))
    }

    /// Snapshot of every stored row in write order
    pub fn entries(&self) -> TeamsheetResult<Vec<AuditLogEntry>> {
        Ok(self.rows()?.clone())
    }

    pub fn len(&self) -> TeamsheetResult<usize> {
        Ok(self.rows()?.len())
    }

    pub fn is_empty(&self) -> TeamsheetResult<bool> {
        Ok(self.rows()?.is_empty())
    }

    /// List stored rows matching `query`, newest first
    pub fn query(&self, query: &AuditQuery) -> TeamsheetResult<Vec<AuditLogEntry>> {
        Ok(query.apply(self.entries()?))
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, entry: &NewAuditEntry) -> TeamsheetResult<AuditLogEntry> {
        let stored = stamp(entry);
        self.rows()?.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{AuditAction, AuditEntityType};
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_sink() -> (JsonlAuditSink, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlAuditSink::new(temp_dir.path().join("audit.log"));
        (sink, temp_dir)
    }

    fn team_update(entity_id: &str) -> NewAuditEntry {
        NewAuditEntry::updated(
            "org-1",
            "coach-1",
            AuditEntityType::Team,
            entity_id,
            &json!({"name": "Old"}),
            &json!({"name": "New"}),
        )
    }

    #[test]
    fn test_append_and_read() {
        let (sink, _temp) = create_test_sink();

        let stored = sink.append(&team_update("team-1")).unwrap();

        let entries = sink.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], stored);
        assert_eq!(entries[0].entry.action, AuditAction::Update);
        assert!(entries[0].entry.changes.as_ref().unwrap().diff.contains_key("name"));
    }

    #[test]
    fn test_sink_assigns_ids_and_timestamps() {
        let (sink, _temp) = create_test_sink();
        let before = Utc::now();

        let a = sink.append(&team_update("team-1")).unwrap();
        let b = sink.append(&team_update("team-1")).unwrap();

        assert_ne!(a.id, b.id);
        assert!(a.created_at >= before);
        assert!(b.created_at >= a.created_at);
    }

    #[test]
    fn test_empty_log() {
        let (sink, _temp) = create_test_sink();

        assert!(!sink.exists());
        assert_eq!(sink.entry_count().unwrap(), 0);
        assert!(sink.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_line_reported_with_line_number() {
        let (sink, _temp) = create_test_sink();
        sink.append(&team_update("team-1")).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(sink.path())
            .unwrap()
            .write_all(b"{broken\n")
            .unwrap();

        let err = sink.read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_survives_restart() {
        let (sink, temp) = create_test_sink();
        sink.append(&team_update("team-1")).unwrap();

        let reopened = JsonlAuditSink::new(temp.path().join("audit.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_query_newest_first() {
        let (sink, _temp) = create_test_sink();
        for i in 0..5 {
            sink.append(&team_update(&format!("team-{}", i))).unwrap();
        }

        let recent = sink.query(&AuditQuery::default().with_limit(2)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].entry.entity_id, "team-4");
        assert_eq!(recent[1].entry.entity_id, "team-3");
    }

    #[test]
    fn test_append_fails_when_directory_missing() {
        let temp = TempDir::new().unwrap();
        let sink = JsonlAuditSink::new(temp.path().join("missing").join("audit.log"));
        assert!(sink.append(&team_update("team-1")).is_err());
    }

    #[test]
    fn test_concurrent_appends_same_entity_all_stored() {
        let (sink, _temp) = create_test_sink();
        let sink = Arc::new(sink);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        sink.append(&team_update("team-1")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = sink.read_all().unwrap();
        assert_eq!(entries.len(), 80);
        let ids: HashSet<Uuid> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemoryAuditSink::new();
        assert!(sink.is_empty().unwrap());

        sink.append(&team_update("team-1")).unwrap();
        sink.append(&team_update("team-2")).unwrap();

        assert_eq!(sink.len().unwrap(), 2);
        let listed = sink.query(&AuditQuery::for_organization("org-1")).unwrap();
        assert_eq!(listed[0].entry.entity_id, "team-2");
    }

    #[test]
    fn test_memory_sink_reports_poisoned_lock() {
        let sink = Arc::new(MemoryAuditSink::new());
        sink.append(&team_update("team-1")).unwrap();

        let holder = Arc::clone(&sink);
        let _ = std::thread::spawn(move || {
            let _guard = holder.rows.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(sink.entries(), Err(TeamsheetError::Audit(_))));
        assert!(sink.len().is_err());
        assert!(sink.append(&team_update("team-2")).is_err());
    }
}
