//! HMAC-SHA256 signing and base64url segment encoding
//!
//! The primitives here know nothing about tokens. They sign a message,
//! check a tag in constant time, and move bytes to and from the URL-safe
//! text used in links.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{TeamsheetError, TeamsheetResult};

use super::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes
pub const TAG_SIZE: usize = 32;

fn keyed_mac(secret: &SigningSecret) -> TeamsheetResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| TeamsheetError::Token(format!("Failed to create HMAC: {}", e)))
}

/// Compute HMAC-SHA256(secret, message)
pub fn sign(secret: &SigningSecret, message: &[u8]) -> TeamsheetResult<Vec<u8>> {
    let mut mac = keyed_mac(secret)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Check a tag against HMAC-SHA256(secret, message) in constant time
pub fn verify(secret: &SigningSecret, message: &[u8], tag: &[u8]) -> bool {
    match keyed_mac(secret) {
        Ok(mut mac) => {
            mac.update(message);
            mac.verify_slice(tag).is_ok()
        }
        Err(_) => false,
    }
}

/// Encode bytes as unpadded base64url
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url
pub fn decode_segment(text: &str) -> TeamsheetResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| TeamsheetError::Token(format!("Invalid base64url segment: {}", e)))
}
