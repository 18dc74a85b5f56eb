//! Issuing and verifying confirmation tokens
//!
//! A token is `base64url(JSON payload) + "." + base64url(HMAC-SHA256 tag)`.
//! Verification needs only the secret and a clock; nothing is stored.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::debug;

use crate::crypto::{self, SigningSecret};
use crate::error::{TeamsheetError, TeamsheetResult};

use super::payload::ConfirmationPayload;
use super::DEFAULT_CONFIRMATION_PATH;

/// Validity used when the caller doesn't pick one
pub const DEFAULT_VALIDITY: Duration = Duration::hours(72);

/// Why a token was refused. Only ever logged, never handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenRejection {
    Malformed,
    BadSignature,
    BadPayload,
    Expired,
}

/// Issues and verifies stateless attendance confirmation tokens
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SigningSecret,
    pub(super) confirmation_path: String,
}

impl TokenService {
    /// Create a token service keyed with `secret`
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            confirmation_path: DEFAULT_CONFIRMATION_PATH.to_string(),
        }
    }

    /// Override the endpoint path used by confirmation URLs
    pub fn with_confirmation_path(mut self, path: impl Into<String>) -> Self {
        self.confirmation_path = path.into();
        self
    }

    /// Issue a token that expires `validity` from now
    pub fn issue(
        &self,
        session_id: &str,
        subject_id: &str,
        validity: Duration,
    ) -> TeamsheetResult<String> {
        self.issue_at(Utc::now(), session_id, subject_id, validity)
    }

    /// Issue a token that expires `validity` after `now`
    pub fn issue_at(
        &self,
        now: DateTime<Utc>,
        session_id: &str,
        subject_id: &str,
        validity: Duration,
    ) -> TeamsheetResult<String> {
        if session_id.trim().is_empty() {
            return Err(TeamsheetError::Validation(
                "Session id must not be empty".to_string(),
            ));
        }
        if subject_id.trim().is_empty() {
            return Err(TeamsheetError::Validation(
                "Subject id must not be empty".to_string(),
            ));
        }
        if validity <= Duration::zero() {
            return Err(TeamsheetError::Validation(format!(
                "Token validity must be positive, got {}s",
                validity.num_seconds()
            )));
        }

        let expires_at = now
            .checked_add_signed(validity)
            .ok_or_else(|| TeamsheetError::Validation("Token validity is too large".to_string()))?
            .trunc_subsecs(3);

        let payload = ConfirmationPayload {
            session_id: session_id.to_string(),
            subject_id: subject_id.to_string(),
            expires_at,
        };

        let json = serde_json::to_vec(&payload)?;
        let payload_text = crypto::encode_segment(&json);
        let tag = crypto::sign(&self.secret, payload_text.as_bytes())?;

        Ok(format!("{}.{}", payload_text, crypto::encode_segment(&tag)))
    }

    /// Verify a token against the current clock
    ///
    /// Returns `None` for every kind of failure.
    pub fn verify(&self, token: &str) -> Option<ConfirmationPayload> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as of `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<ConfirmationPayload> {
        match self.check(token, now) {
            Ok(payload) => Some(payload),
            Err(reason) => {
                debug!(?reason, "Rejected confirmation token");
                None
            }
        }
    }

    fn check(&self, token: &str, now: DateTime<Utc>) -> Result<ConfirmationPayload, TokenRejection> {
        let (payload_text, signature_text) =
            token.split_once('.').ok_or(TokenRejection::Malformed)?;
        if payload_text.is_empty() || signature_text.is_empty() || signature_text.contains('.') {
            return Err(TokenRejection::Malformed);
        }

        let tag = crypto::decode_segment(signature_text).map_err(|_| TokenRejection::BadSignature)?;
        if !crypto::verify(&self.secret, payload_text.as_bytes(), &tag) {
            return Err(TokenRejection::BadSignature);
        }

        let json = crypto::decode_segment(payload_text).map_err(|_| TokenRejection::BadPayload)?;
        let payload: ConfirmationPayload =
            serde_json::from_slice(&json).map_err(|_| TokenRejection::BadPayload)?;

        if !payload.is_live_at(now) {
            return Err(TokenRejection::Expired);
        }

        Ok(payload)
    }
}
