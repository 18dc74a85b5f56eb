//! Stateless attendance confirmation tokens
//!
//! Tokens bind a (session, subject) pair to an expiry instant and are signed
//! with the shared secret. They cannot be revoked before they expire short of
//! rotating the secret, which invalidates every outstanding link.
//!
//! A still-valid token can be presented more than once. The token layer does
//! not prevent that; see `services::attendance` for at-most-once confirmation.
//!
//! # Example
//!
//! ```rust,ignore
//! use teamsheet::crypto::SigningSecret;
//! use teamsheet::token::{TokenService, DEFAULT_VALIDITY};
//!
//! let tokens = TokenService::new(SigningSecret::from_env("TEAMSHEET_AUTH_SECRET")?);
//! let token = tokens.issue("session-1", "athlete-7", DEFAULT_VALIDITY)?;
//!
//! match tokens.verify(&token) {
//!     Some(payload) => println!("{} confirmed {}", payload.subject_id, payload.session_id),
//!     None => println!("link invalid or expired"),
//! }
//! ```

mod payload;
mod service;
mod url;

pub use payload::ConfirmationPayload;
pub use service::{TokenService, DEFAULT_VALIDITY};
pub use url::{confirmation_url, token_from_url, TOKEN_QUERY_PARAM};

/// Endpoint path confirmation links point at
pub const DEFAULT_CONFIRMATION_PATH: &str = "/api/attendance/confirm";
