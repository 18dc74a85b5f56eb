//! Service layer for Teamsheet
//!
//! The service layer provides business logic on top of the token, storage
//! and audit layers.

pub mod attendance;

pub use attendance::{AttendanceService, ConfirmationOutcome};
