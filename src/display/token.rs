//! Token payload display formatting

use chrono::{DateTime, Utc};

use crate::token::ConfirmationPayload;

/// Format a verified payload, including the time left before it expires
pub fn format_payload(payload: &ConfirmationPayload, now: DateTime<Utc>) -> String {
    let remaining = payload.expires_at - now;
    let left = if remaining.num_hours() >= 1 {
        format!("{}h {}m", remaining.num_hours(), remaining.num_minutes() % 60)
    } else {
        format!("{}m", remaining.num_minutes().max(0))
    };

    format!(
        "Session: {}\nSubject: {}\nExpires: {} ({} left)",
        payload.session_id,
        payload.subject_id,
        payload.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        left
    )
}
