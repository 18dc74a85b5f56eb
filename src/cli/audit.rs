//! Audit CLI commands
//!
//! Lists stored audit rows and diffs entity snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde_json::Value;

use crate::audit::{compute_diff, AuditAction, AuditEntityType, AuditQuery, JsonlAuditSink};
use crate::config::TeamsheetPaths;
use crate::display::{format_audit_details, format_audit_list};
use crate::error::{TeamsheetError, TeamsheetResult};

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// List audit entries, newest first
    List {
        /// Organization ID (omit for every organization)
        #[arg(long)]
        org: Option<String>,
        /// Acting user ID
        #[arg(long)]
        user: Option<String>,
        /// Entity type (e.g. team, athlete, attendance)
        #[arg(long)]
        entity_type: Option<String>,
        /// Entity ID
        #[arg(long)]
        entity_id: Option<String>,
        /// Action (e.g. create, update, confirm)
        #[arg(long)]
        action: Option<String>,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Number of entries to skip
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Show one detailed block per entry
        #[arg(long)]
        details: bool,
    },
    /// Print the field diff between two JSON snapshots
    Diff {
        /// Snapshot before the change
        before: PathBuf,
        /// Snapshot after the change
        after: PathBuf,
    },
}

fn read_snapshot(path: &Path) -> TeamsheetResult<Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| TeamsheetError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| TeamsheetError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Handle an audit command
pub fn handle_audit_command(paths: &TeamsheetPaths, cmd: AuditCommands) -> TeamsheetResult<()> {
    match cmd {
        AuditCommands::List {
            org,
            user,
            entity_type,
            entity_id,
            action,
            limit,
            offset,
            details,
        } => {
            let entity_type = entity_type
                .map(|t| {
                    AuditEntityType::parse(&t).ok_or_else(|| {
                        TeamsheetError::Validation(format!("Unknown entity type: {}", t))
                    })
                })
                .transpose()?;
            let action = action
                .map(|a| {
                    AuditAction::parse(&a)
                        .ok_or_else(|| TeamsheetError::Validation(format!("Unknown action: {}", a)))
                })
                .transpose()?;

            let query = AuditQuery {
                organization_id: org,
                user_id: user,
                entity_type,
                entity_id,
                action,
                limit: Some(limit),
                offset,
            };

            let sink = JsonlAuditSink::new(paths.audit_log());
            let entries = sink.query(&query)?;

            if details && !entries.is_empty() {
                for entry in &entries {
                    println!("{}\n", format_audit_details(entry));
                }
            } else {
                println!("{}", format_audit_list(&entries));
            }
        }

        AuditCommands::Diff { before, after } => {
            let diff = compute_diff(&read_snapshot(&before)?, &read_snapshot(&after)?);
            println!("{}", serde_json::to_string_pretty(&diff)?);
        }
    }

    Ok(())
}
