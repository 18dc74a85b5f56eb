//! Display formatting for terminal output
//!
//! Formats audit rows and token payloads for the CLI.

pub mod audit;
pub mod token;

pub use audit::{format_audit_details, format_audit_list};
pub use token::format_payload;
