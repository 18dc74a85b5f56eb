//! Attendance CLI commands
//!
//! Consumes confirmation tokens and lists recorded confirmations.

use std::sync::Arc;

use clap::Subcommand;

use crate::audit::{AuditLogger, AuditMetadata, JsonlAuditSink};
use crate::config::{Settings, TeamsheetPaths};
use crate::error::TeamsheetResult;
use crate::services::{AttendanceService, ConfirmationOutcome};
use crate::storage::ConfirmationStore;
use crate::token::token_from_url;

use super::token::{invalid_link, token_service};

/// Attendance subcommands
#[derive(Subcommand)]
pub enum AttendanceCommands {
    /// Confirm attendance with a token or confirmation link
    Confirm {
        /// Token, or a full confirmation URL
        token: String,
        /// Organization ID the session belongs to
        #[arg(long)]
        org: String,
        /// Client IP recorded on the audit entry
        #[arg(long)]
        ip: Option<String>,
        /// Client user agent recorded on the audit entry
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// List confirmations recorded for a session
    List {
        /// Session ID
        #[arg(long)]
        session: String,
    },
}

/// Handle an attendance command
pub fn handle_attendance_command(
    paths: &TeamsheetPaths,
    settings: &Settings,
    cmd: AttendanceCommands,
) -> TeamsheetResult<()> {
    let store = ConfirmationStore::new(paths.confirmations_file());
    store.load()?;

    match cmd {
        AttendanceCommands::Confirm {
            token,
            org,
            ip,
            user_agent,
        } => {
            let tokens = token_service(settings)?;
            let audit = AuditLogger::new(Arc::new(JsonlAuditSink::new(paths.audit_log())));
            let service = AttendanceService::new(&tokens, &store, &audit);

            let metadata = (ip.is_some() || user_agent.is_some()).then(|| AuditMetadata {
                ip_address: ip,
                user_agent,
                ..AuditMetadata::default()
            });

            let token = token_from_url(&token).unwrap_or(token);
            let outcome = service.confirm(&token, &org, metadata)?;

            match &outcome {
                ConfirmationOutcome::Confirmed(c) | ConfirmationOutcome::AlreadyConfirmed(c) => {
                    println!(
                        "{}: session {} subject {} at {}",
                        outcome.message(),
                        c.session_id,
                        c.subject_id,
                        c.confirmed_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                ConfirmationOutcome::Invalid => return Err(invalid_link()),
            }
        }

        AttendanceCommands::List { session } => {
            let confirmations = store.get_by_session(&session)?;

            if confirmations.is_empty() {
                println!("No confirmations for session {}.", session);
                return Ok(());
            }

            println!("{:30} {:20}", "Subject", "Confirmed");
            println!("{}", "-".repeat(51));
            for c in &confirmations {
                println!(
                    "{:30} {:20}",
                    c.subject_id,
                    c.confirmed_at.format("%Y-%m-%d %H:%M:%S").to_string()
                );
            }
            println!("\nTotal: {} confirmed", confirmations.len());
        }
    }

    Ok(())
}
