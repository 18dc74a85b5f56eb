//! Storage layer for Teamsheet
//!
//! Provides JSON file storage with atomic writes and a cross-process lock
//! for recorded attendance.
//! The audit log lives in `audit` and is append-only.

pub mod confirmations;
pub mod file_io;

pub use confirmations::{AttendanceConfirmation, ConfirmationStore};
pub use file_io::{read_json, write_json_atomic, StoreLock};
