//! Configuration module for Teamsheet
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence

pub mod paths;
pub mod settings;

pub use paths::TeamsheetPaths;
pub use settings::Settings;
