//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod attendance;
pub mod audit;
pub mod token;

pub use attendance::{handle_attendance_command, AttendanceCommands};
pub use audit::{handle_audit_command, AuditCommands};
pub use token::{handle_token_command, TokenCommands};
