//! Reading audit rows back for organization and platform-admin views

use super::entry::{AuditAction, AuditEntityType, AuditLogEntry};

/// Filter for listing audit entries
///
/// `organization_id: None` is the platform-admin view across every
/// organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditQuery {
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub entity_type: Option<AuditEntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl AuditQuery {
    /// Entries belonging to one organization
    pub fn for_organization(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: Some(organization_id.into()),
            ..Default::default()
        }
    }

    /// Entries for one entity across every organization
    pub fn for_entity(entity_type: AuditEntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a single entry passes every filter that is set
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        let e = &entry.entry;
        self.organization_id
            .as_ref()
            .map_or(true, |org| &e.organization_id == org)
            && self.user_id.as_ref().map_or(true, |u| &e.user_id == u)
            && self.entity_type.map_or(true, |t| e.entity_type == t)
            && self.entity_id.as_ref().map_or(true, |id| &e.entity_id == id)
            && self.action.map_or(true, |a| e.action == a)
    }

    /// Filter, order newest first and paginate entries given in insertion order
    ///
    /// Rows with the same `created_at` come out latest-inserted first.
    pub fn apply(&self, entries: Vec<AuditLogEntry>) -> Vec<AuditLogEntry> {
        let mut selected: Vec<AuditLogEntry> = entries
            .into_iter()
            .rev()
            .filter(|entry| self.matches(entry))
            .collect();

        // Stable sort keeps the reversed insertion order among ties
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = selected.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        }
    }
}
