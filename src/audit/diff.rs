//! Field-level diffs for audit logging
//!
//! Compares two flat snapshots of an entity and records only the fields
//! whose values changed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Fields that change on every write and carry no audit signal
pub const EXCLUDED_FIELDS: &[&str] = &["createdAt", "updatedAt"];

/// Changed field name -> old and new value
pub type Diff = BTreeMap<String, FieldChange>;

/// One changed field
///
/// `None` means the key was absent on that side, which is distinct from a
/// present `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub from: Option<Value>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub to: Option<Value>,
}

/// Keep an explicit `null` as `Some(Value::Null)`; only a missing key is `None`
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Compute the field-level diff between two entity snapshots
///
/// Keys from both sides are considered. Excluded fields are skipped, and a
/// key present on only one side is reported with `None` on the other.
/// Values compare structurally; object key order does not matter.
/// Anything other than a JSON object is treated as an empty record.
pub fn compute_diff(before: &Value, after: &Value) -> Diff {
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    keys.into_iter()
        .filter(|key| !EXCLUDED_FIELDS.contains(&key.as_str()))
        .filter_map(|key| {
            let from = before.get(key);
            let to = after.get(key);
            if from == to {
                return None;
            }
            Some((
                key.clone(),
                FieldChange {
                    from: from.cloned(),
                    to: to.cloned(),
                },
            ))
        })
        .collect()
}

/// Render a diff as a one-line summary, e.g. `name: "Old" -> "New"`
pub fn summarize_diff(diff: &Diff) -> Option<String> {
    if diff.is_empty() {
        return None;
    }

    let changes: Vec<String> = diff
        .iter()
        .map(|(key, change)| {
            format!(
                "{}: {} -> {}",
                key,
                format_side(change.from.as_ref(), "(added)"),
                format_side(change.to.as_ref(), "(removed)")
            )
        })
        .collect();

    Some(changes.join(", "))
}

fn format_side(value: Option<&Value>, absent: &str) -> String {
    match value {
        Some(v) => format_value(v),
        None => absent.to_string(),
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
