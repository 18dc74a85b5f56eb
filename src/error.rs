//! Custom error types for Teamsheet
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Teamsheet operations
#[derive(Error, Debug)]
pub enum TeamsheetError {
    /// Configuration-related errors (missing secret, unreadable settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for caller-supplied input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Audit sink errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Signing errors
    #[error("Token error: {0}")]
    Token(String),

    /// Attendance was already recorded for this session and subject
    #[error("Attendance already confirmed for session {session_id} by {subject_id}")]
    AlreadyConfirmed {
        session_id: String,
        subject_id: String,
    },
}

impl TeamsheetError {
    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for TeamsheetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TeamsheetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Teamsheet operations
pub type TeamsheetResult<T> = Result<T, TeamsheetError>;
