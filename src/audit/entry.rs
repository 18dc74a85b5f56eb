//! Audit entry data structures
//!
//! Defines the actions and entity types that can be audited, the entry a
//! caller submits, and the stored row a sink hands back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::diff::{compute_diff, summarize_diff, Diff};

/// Verbs that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Archive,
    Restore,
    Login,
    Logout,
    Invite,
    Confirm,
    Export,
    Impersonate,
}

impl AuditAction {
    /// Parse from the stored lowercase name
    pub fn parse(s: &str) -> Option<Self> {
        let action = match s.to_ascii_lowercase().as_str() {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "archive" => Self::Archive,
            "restore" => Self::Restore,
            "login" => Self::Login,
            "logout" => Self::Logout,
            "invite" => Self::Invite,
            "confirm" => Self::Confirm,
            "export" => Self::Export,
            "impersonate" => Self::Impersonate,
            _ => return None,
        };
        Some(action)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Archive => "ARCHIVE",
            AuditAction::Restore => "RESTORE",
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Invite => "INVITE",
            AuditAction::Confirm => "CONFIRM",
            AuditAction::Export => "EXPORT",
            AuditAction::Impersonate => "IMPERSONATE",
        };
        write!(f, "{}", label)
    }
}

/// Domain nouns that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    Organization,
    User,
    Athlete,
    Coach,
    Team,
    Session,
    Attendance,
    Payment,
    Subscription,
    Invitation,
    ApiKey,
    Document,
}

impl AuditEntityType {
    /// Parse from the stored snake_case name
    pub fn parse(s: &str) -> Option<Self> {
        let entity_type = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "organization" => Self::Organization,
            "user" => Self::User,
            "athlete" => Self::Athlete,
            "coach" => Self::Coach,
            "team" => Self::Team,
            "session" => Self::Session,
            "attendance" => Self::Attendance,
            "payment" => Self::Payment,
            "subscription" => Self::Subscription,
            "invitation" => Self::Invitation,
            "api_key" => Self::ApiKey,
            "document" => Self::Document,
            _ => return None,
        };
        Some(entity_type)
    }
}

impl std::fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AuditEntityType::Organization => "Organization",
            AuditEntityType::User => "User",
            AuditEntityType::Athlete => "Athlete",
            AuditEntityType::Coach => "Coach",
            AuditEntityType::Team => "Team",
            AuditEntityType::Session => "Session",
            AuditEntityType::Attendance => "Attendance",
            AuditEntityType::Payment => "Payment",
            AuditEntityType::Subscription => "Subscription",
            AuditEntityType::Invitation => "Invitation",
            AuditEntityType::ApiKey => "ApiKey",
            AuditEntityType::Document => "Document",
        };
        write!(f, "{}", label)
    }
}

/// Before/after snapshots plus the computed field diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    #[serde(default)]
    pub diff: Diff,
}

impl AuditChanges {
    /// Build changes from two snapshots; a missing side counts as an empty record
    pub fn between(before: Option<Value>, after: Option<Value>) -> Self {
        let diff = compute_diff(
            before.as_ref().unwrap_or(&Value::Null),
            after.as_ref().unwrap_or(&Value::Null),
        );
        Self {
            before,
            after,
            diff,
        }
    }
}

/// Request context captured alongside an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Platform admin acting on the user's behalf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impersonated_by: Option<String>,

    /// API procedure that triggered the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_path: Option<String>,
}

/// An entry as submitted by calling code, before the sink assigns an id
/// and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    pub organization_id: String,

    /// Acting user
    pub user_id: String,

    /// Request/session context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<AuditChanges>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AuditMetadata>,
}

impl NewAuditEntry {
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        action: AuditAction,
        entity_type: AuditEntityType,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            session_id: None,
            action,
            entity_type,
            entity_id: entity_id.into(),
            changes: None,
            metadata: None,
        }
    }

    /// Entry for a create operation
    pub fn created<T: Serialize>(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        entity_type: AuditEntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        Self::new(
            organization_id,
            user_id,
            AuditAction::Create,
            entity_type,
            entity_id,
        )
        .with_changes(AuditChanges::between(None, serde_json::to_value(entity).ok()))
    }

    /// Entry for an update operation
    pub fn updated<T: Serialize>(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        entity_type: AuditEntityType,
        entity_id: impl Into<String>,
        before: &T,
        after: &T,
    ) -> Self {
        Self::new(
            organization_id,
            user_id,
            AuditAction::Update,
            entity_type,
            entity_id,
        )
        .with_changes(AuditChanges::between(
            serde_json::to_value(before).ok(),
            serde_json::to_value(after).ok(),
        ))
    }

    /// Entry for a delete operation
    pub fn deleted<T: Serialize>(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        entity_type: AuditEntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> Self {
        Self::new(
            organization_id,
            user_id,
            AuditAction::Delete,
            entity_type,
            entity_id,
        )
        .with_changes(AuditChanges::between(serde_json::to_value(entity).ok(), None))
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_changes(mut self, changes: AuditChanges) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn with_metadata(mut self, metadata: AuditMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A stored audit row. Never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,

    /// Assigned by the sink at write time
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub entry: NewAuditEntry,
}

impl AuditLogEntry {
    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {} by {} (org {})",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.entry.action,
            self.entry.entity_type,
            self.entry.entity_id,
            self.entry.user_id,
            self.entry.organization_id
        );

        if let Some(admin) = self
            .entry
            .metadata
            .as_ref()
            .and_then(|m| m.impersonated_by.as_ref())
        {
            output.push_str(&format!(" impersonated by {}", admin));
        }

        if let Some(summary) = self
            .entry
            .changes
            .as_ref()
            .and_then(|c| summarize_diff(&c.diff))
        {
            output.push_str(&format!("\n  Changes: {}", summary));
        }

        output
    }
}
