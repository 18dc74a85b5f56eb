//! Confirmation token payload
//!
//! The payload is the JSON object carried in the first token segment. Key
//! names and the timestamp format are part of the wire format and must stay
//! stable for links that are already out in the wild.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a confirmation token proves: `subject_id` may confirm
/// `session_id` until `expires_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPayload {
    /// Training or event session being confirmed
    pub session_id: String,

    /// Athlete confirming attendance
    pub subject_id: String,

    /// Absolute expiry instant (millisecond precision)
    #[serde(with = "millis_rfc3339")]
    pub expires_at: DateTime<Utc>,
}

impl ConfirmationPayload {
    /// Whether the payload is still usable at `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// `2025-01-02T03:04:05.678Z`, the same text a JavaScript `Date` produces
mod millis_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
