//! Operational logging setup
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::error::TeamsheetError;

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "TEAMSHEET_LOG";

/// Default filter directive for the given verbosity flags
pub fn default_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_tracing(quiet: bool, verbose: bool) -> Result<(), TeamsheetError> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(quiet, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TeamsheetError::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), "warn");
        assert_eq!(default_level(false, true), "debug");
        assert_eq!(default_level(true, false), "error");
        // quiet wins
        assert_eq!(default_level(true, true), "error");
    }
}
