//! Best-effort audit logging
//!
//! Writing an audit row must never decide whether the operation it describes
//! succeeds. `try_log` is the fallible path; `log` and `dispatch` swallow
//! errors after recording them to the operational log.

use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::error;

use crate::error::TeamsheetResult;

use super::entry::{AuditLogEntry, NewAuditEntry};
use super::sink::AuditSink;

/// Front end that business code calls after a mutation
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Append the entry, reporting any failure to the caller
    pub fn try_log(&self, entry: &NewAuditEntry) -> TeamsheetResult<AuditLogEntry> {
        self.sink.append(entry)
    }

    /// Append the entry; failures are logged at error level and dropped
    ///
    /// There is one attempt and no retry.
    pub fn log(&self, entry: NewAuditEntry) {
        if let Err(err) = self.try_log(&entry) {
            let attempted = serde_json::to_string(&entry)
                .unwrap_or_else(|_| format!("{:?}", entry));
            error!(
                error = %err,
                organization_id = %entry.organization_id,
                entity_type = %entry.entity_type,
                entity_id = %entry.entity_id,
                entry = %attempted,
                "Failed to write audit log entry"
            );
        }
    }

    /// Run `log` on a background thread so a slow sink can't hold up the caller
    ///
    /// The handle may be dropped; joining it only waits for the write.
    pub fn dispatch(&self, entry: NewAuditEntry) -> JoinHandle<()> {
        let logger = self.clone();
        std::thread::spawn(move || logger.log(entry))
    }
}
