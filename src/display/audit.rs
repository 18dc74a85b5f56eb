//! Audit log display formatting
//!
//! Formats audit rows for terminal output in table and detail views.

use crate::audit::{summarize_diff, AuditLogEntry};

const SUMMARY_WIDTH: usize = 60;

/// Format audit rows as a table, newest first as given
pub fn format_audit_list(entries: &[AuditLogEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.".to_string();
    }

    let entity_width = entries
        .iter()
        .map(|e| e.entry.entity_type.to_string().len() + 1 + e.entry.entity_id.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);

    let user_width = entries
        .iter()
        .map(|e| e.entry.user_id.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<19}  {:<11}  {:<entity_width$}  {:<user_width$}  {}\n",
        "Time",
        "Action",
        "Entity",
        "User",
        "Changes",
        entity_width = entity_width,
        user_width = user_width,
    ));

    output.push_str(&format!(
        "{:-<19}  {:-<11}  {:-<entity_width$}  {:-<user_width$}  {:-<7}\n",
        "",
        "",
        "",
        "",
        "",
        entity_width = entity_width,
        user_width = user_width,
    ));

    for entry in entries {
        let summary = entry
            .entry
            .changes
            .as_ref()
            .and_then(|c| summarize_diff(&c.diff))
            .map(|s| truncate(&s, SUMMARY_WIDTH))
            .unwrap_or_default();

        output.push_str(&format!(
            "{:<19}  {:<11}  {:<entity_width$}  {:<user_width$}  {}\n",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.entry.action.to_string(),
            format!("{}/{}", entry.entry.entity_type, entry.entry.entity_id),
            entry.entry.user_id,
            summary,
            entity_width = entity_width,
            user_width = user_width,
        ));
    }

    output.push_str(&format!("\nTotal: {} entries", entries.len()));
    output
}

/// Format a single audit row with its request context
pub fn format_audit_details(entry: &AuditLogEntry) -> String {
    let mut output = entry.format_human_readable();

    output.push_str(&format!("\n  ID: {}", entry.id));
    if let Some(session) = &entry.entry.session_id {
        output.push_str(&format!("\n  Session: {}", session));
    }
    if let Some(metadata) = &entry.entry.metadata {
        if let Some(ip) = &metadata.ip_address {
            output.push_str(&format!("\n  IP: {}", ip));
        }
        if let Some(agent) = &metadata.user_agent {
            output.push_str(&format!("\n  User agent: {}", agent));
        }
        if let Some(path) = &metadata.procedure_path {
            output.push_str(&format!("\n  Procedure: {}", path));
        }
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEntityType, AuditMetadata, NewAuditEntry};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn row(entry: NewAuditEntry) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            entry,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_audit_list(&[]), "No audit entries found.");
    }

    #[test]
    fn test_list_contains_rows() {
        let entries = vec![
            row(NewAuditEntry::updated(
                "org-1",
                "coach-1",
                AuditEntityType::Team,
                "team-1",
                &json!({"name": "Hawks"}),
                &json!({"name": "Falcons"}),
            )),
            row(NewAuditEntry::created(
                "org-1",
                "coach-2",
                AuditEntityType::Session,
                "s1",
                &json!({"title": "Practice"}),
            )),
        ];

        let output = format_audit_list(&entries);

        assert!(output.contains("UPDATE"));
        assert!(output.contains("Team/team-1"));
        assert!(output.contains("coach-2"));
        assert!(output.contains("Falcons"));
        assert!(output.contains("Total: 2 entries"));
    }

    #[test]
    fn test_details_include_metadata() {
        let entry = row(
            NewAuditEntry::deleted(
                "org-1",
                "coach-1",
                AuditEntityType::Athlete,
                "a1",
                &json!({"name": "Sam"}),
            )
            .with_session("req-9")
            .with_metadata(AuditMetadata {
                ip_address: Some("198.51.100.4".to_string()),
                ..AuditMetadata::default()
            }),
        );

        let output = format_audit_details(&entry);
        assert!(output.contains("Session: req-9"));
        assert!(output.contains("IP: 198.51.100.4"));
    }

    #[test]
    fn test_list_aligns_non_ascii_ids() {
        let entries = vec![
            row(NewAuditEntry::created(
                "org-1",
                "entraîneur-é",
                AuditEntityType::Athlete,
                "zoë-müller",
                &json!({"name": "Zoë"}),
            )),
            row(NewAuditEntry::created(
                "org-1",
                "coach-1",
                AuditEntityType::Athlete,
                "a1",
                &json!({"name": "Sam"}),
            )),
        ];

        let output = format_audit_list(&entries);
        let lines: Vec<&str> = output.lines().take(4).collect();

        // The Changes column starts at the same character offset on every row
        let offsets: Vec<usize> = lines
            .iter()
            .map(|line| {
                let byte = line.rfind("  ").unwrap() + 2;
                line[..byte].chars().count()
            })
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] == w[1]), "{:?}", offsets);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
