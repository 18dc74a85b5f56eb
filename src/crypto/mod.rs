//! Cryptographic functions for Teamsheet
//!
//! Provides HMAC-SHA256 signing with base64url encoding, and the
//! zeroize-on-drop secret it is keyed with.

pub mod secret;
pub mod signing;

pub use secret::SigningSecret;
pub use signing::{decode_segment, encode_segment, sign, verify};
