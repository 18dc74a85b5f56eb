//! Audit logging system for Teamsheet
//!
//! Records state-changing operations with before/after snapshots and a
//! field-level diff in an append-only audit log.
//!
//! # Architecture
//!
//! - `NewAuditEntry`: what calling code submits: organization, actor, action,
//!   entity reference, optional changes and request metadata.
//! - `AuditSink`: append-only persistence. `JsonlAuditSink` writes one JSON
//!   line per row; `MemoryAuditSink` keeps rows in memory. The sink assigns
//!   the row id and `createdAt`.
//! - `AuditLogger`: best-effort front end. `log` never fails; `try_log` is the
//!   fallible path underneath it.
//! - `compute_diff`: field-level diff between two entity snapshots.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use teamsheet::audit::{AuditEntityType, AuditLogger, JsonlAuditSink, NewAuditEntry};
//!
//! let logger = AuditLogger::new(Arc::new(JsonlAuditSink::new(audit_log_path)));
//!
//! logger.log(NewAuditEntry::updated(
//!     org_id,
//!     user_id,
//!     AuditEntityType::Team,
//!     team_id,
//!     &before,
//!     &after,
//! ));
//! ```

mod diff;
mod entry;
mod logger;
mod query;
mod sink;

pub use diff::{compute_diff, summarize_diff, Diff, FieldChange, EXCLUDED_FIELDS};
pub use entry::{
    AuditAction, AuditChanges, AuditEntityType, AuditLogEntry, AuditMetadata, NewAuditEntry,
};
pub use logger::AuditLogger;
pub use query::AuditQuery;
pub use sink::{AuditSink, JsonlAuditSink, MemoryAuditSink};
