//! Shared signing secret
//!
//! The secret is process-wide configuration, but it is never read from
//! ambient scope by the services that use it: callers load it once and
//! inject it. The bytes are zeroed when the value is dropped.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{TeamsheetError, TeamsheetResult};

/// Environment variable the secret is read from when settings don't say otherwise
pub const DEFAULT_SECRET_ENV: &str = "TEAMSHEET_AUTH_SECRET";

/// HMAC key material that zeros its contents on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl SigningSecret {
    /// Create a secret from raw bytes
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the secret is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> TeamsheetResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TeamsheetError::Config(
                "Signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Load the secret from an environment variable
    ///
    /// Fails when the variable is missing or empty; there is no default.
    pub fn from_env(var: &str) -> TeamsheetResult<Self> {
        let value = std::env::var(var).map_err(|_| {
            TeamsheetError::Config(format!("{} is not set; cannot sign tokens", var))
        })?;
        Self::new(value.into_bytes()).map_err(|_| {
            TeamsheetError::Config(format!("{} is empty; cannot sign tokens", var))
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.bytes.len())
    }
}
