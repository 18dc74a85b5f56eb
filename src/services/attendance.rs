//! Attendance confirmation service
//!
//! Consumes confirmation tokens. A valid token records attendance for its
//! (session, subject) pair at most once and audits the first confirmation.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::audit::{
    AuditAction, AuditChanges, AuditEntityType, AuditLogger, AuditMetadata, NewAuditEntry,
};
use crate::error::{TeamsheetError, TeamsheetResult};
use crate::storage::{AttendanceConfirmation, ConfirmationStore};
use crate::token::TokenService;

/// Result of presenting a confirmation token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Attendance recorded by this call
    Confirmed(AttendanceConfirmation),
    /// The pair was confirmed earlier; the stored record is returned unchanged
    AlreadyConfirmed(AttendanceConfirmation),
    /// Malformed, forged, tampered or expired token
    Invalid,
}

impl ConfirmationOutcome {
    /// Message suitable for showing to the person who followed the link
    pub fn message(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => "attendance confirmed",
            Self::AlreadyConfirmed(_) => "attendance already confirmed",
            Self::Invalid => "link invalid or expired",
        }
    }
}

/// Service for attendance confirmation
pub struct AttendanceService<'a> {
    tokens: &'a TokenService,
    store: &'a ConfirmationStore,
    audit: &'a AuditLogger,
}

impl<'a> AttendanceService<'a> {
    pub fn new(
        tokens: &'a TokenService,
        store: &'a ConfirmationStore,
        audit: &'a AuditLogger,
    ) -> Self {
        Self {
            tokens,
            store,
            audit,
        }
    }

    /// Confirm attendance using the current clock
    pub fn confirm(
        &self,
        token: &str,
        organization_id: &str,
        metadata: Option<AuditMetadata>,
    ) -> TeamsheetResult<ConfirmationOutcome> {
        self.confirm_at(token, organization_id, metadata, Utc::now())
    }

    /// Confirm attendance as of `now`
    pub fn confirm_at(
        &self,
        token: &str,
        organization_id: &str,
        metadata: Option<AuditMetadata>,
        now: DateTime<Utc>,
    ) -> TeamsheetResult<ConfirmationOutcome> {
        let organization_id = organization_id.trim();
        if organization_id.is_empty() {
            return Err(TeamsheetError::Validation(
                "Organization id must not be empty".to_string(),
            ));
        }

        let Some(payload) = self.tokens.verify_at(token, now) else {
            return Ok(ConfirmationOutcome::Invalid);
        };

        let confirmation = AttendanceConfirmation {
            organization_id: organization_id.to_string(),
            session_id: payload.session_id,
            subject_id: payload.subject_id,
            confirmed_at: now,
        };

        match self.store.insert_new(confirmation.clone()) {
            Ok(()) => {}
            Err(TeamsheetError::AlreadyConfirmed {
                session_id,
                subject_id,
            }) => {
                debug!(%session_id, %subject_id, "Confirmation token replayed");
                let existing = self.store.get(&session_id, &subject_id)?.ok_or_else(|| {
                    TeamsheetError::Storage(format!(
                        "Confirmation for {}:{} disappeared",
                        session_id, subject_id
                    ))
                })?;
                return Ok(ConfirmationOutcome::AlreadyConfirmed(existing));
            }
            Err(e) => return Err(e),
        }

        info!(
            session_id = %confirmation.session_id,
            subject_id = %confirmation.subject_id,
            "Attendance confirmed"
        );

        let mut entry = NewAuditEntry::new(
            organization_id,
            confirmation.subject_id.clone(),
            AuditAction::Confirm,
            AuditEntityType::Attendance,
            confirmation.entity_id(),
        )
        .with_changes(AuditChanges::between(
            None,
            serde_json::to_value(&confirmation).ok(),
        ));
        if let Some(metadata) = metadata {
            entry = entry.with_metadata(metadata);
        }
        self.audit.log(entry);

        Ok(ConfirmationOutcome::Confirmed(confirmation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::crypto::SigningSecret;
    use crate::storage::file_io::temp_path;
    use chrono::Duration;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        tokens: TokenService,
        store: ConfirmationStore,
        sink: Arc<MemoryAuditSink>,
        audit: AuditLogger,
        _temp: TempDir,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let sink = Arc::new(MemoryAuditSink::new());
        Fixture {
            tokens: TokenService::new(SigningSecret::new("attendance-secret").unwrap()),
            store: ConfirmationStore::new(temp.path().join("confirmations.json")),
            audit: AuditLogger::new(sink.clone()),
            sink,
            _temp: temp,
        }
    }

    impl Fixture {
        fn service(&self) -> AttendanceService<'_> {
            AttendanceService::new(&self.tokens, &self.store, &self.audit)
        }
    }

    #[test]
    fn test_confirm_records_and_audits() {
        let f = fixture();
        let token = f.tokens.issue("s1", "a1", Duration::hours(72)).unwrap();

        let outcome = f.service().confirm(&token, "org-1", None).unwrap();

        let ConfirmationOutcome::Confirmed(confirmation) = outcome else {
            panic!("expected Confirmed");
        };
        assert_eq!(confirmation.entity_id(), "s1:a1");
        assert!(f.store.get("s1", "a1").unwrap().is_some());

        let entries = f.sink.entries().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0].entry;
        assert_eq!(entry.action, AuditAction::Confirm);
        assert_eq!(entry.entity_type, AuditEntityType::Attendance);
        assert_eq!(entry.entity_id, "s1:a1");
        assert_eq!(entry.user_id, "a1");
        let changes = entry.changes.as_ref().unwrap();
        assert!(changes.before.is_none());
        assert!(changes.after.is_some());
    }

    #[test]
    fn test_replay_is_already_confirmed_without_second_audit() {
        let f = fixture();
        let token = f.tokens.issue("s1", "a1", Duration::hours(72)).unwrap();

        let first = f.service().confirm(&token, "org-1", None).unwrap();
        let second = f.service().confirm(&token, "org-1", None).unwrap();

        let ConfirmationOutcome::Confirmed(original) = first else {
            panic!("expected Confirmed");
        };
        assert_eq!(second, ConfirmationOutcome::AlreadyConfirmed(original));
        assert_eq!(f.sink.len().unwrap(), 1);
        assert_eq!(second.message(), "attendance already confirmed");
    }

    #[test]
    fn test_fresh_token_for_same_pair_is_already_confirmed() {
        let f = fixture();
        let first = f.tokens.issue("s1", "a1", Duration::hours(72)).unwrap();
        let second = f.tokens.issue("s1", "a1", Duration::hours(24)).unwrap();

        f.service().confirm(&first, "org-1", None).unwrap();
        let outcome = f.service().confirm(&second, "org-1", None).unwrap();

        assert!(matches!(outcome, ConfirmationOutcome::AlreadyConfirmed(_)));
        assert_eq!(f.store.count().unwrap(), 1);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let f = fixture();
        let issued = Utc::now() - Duration::hours(73);
        let token = f
            .tokens
            .issue_at(issued, "s1", "a1", Duration::hours(72))
            .unwrap();

        let outcome = f.service().confirm(&token, "org-1", None).unwrap();

        assert_eq!(outcome, ConfirmationOutcome::Invalid);
        assert_eq!(outcome.message(), "link invalid or expired");
        assert!(f.sink.is_empty().unwrap());
        assert_eq!(f.store.count().unwrap(), 0);
    }

    #[test]
    fn test_foreign_token_is_invalid() {
        let f = fixture();
        let other = TokenService::new(SigningSecret::new("someone-else").unwrap());
        let token = other.issue("s1", "a1", Duration::hours(72)).unwrap();

        let outcome = f.service().confirm(&token, "org-1", None).unwrap();
        assert_eq!(outcome, ConfirmationOutcome::Invalid);
    }

    #[test]
    fn test_metadata_is_attached_to_audit_entry() {
        let f = fixture();
        let token = f.tokens.issue("s1", "a1", Duration::hours(1)).unwrap();
        let metadata = AuditMetadata {
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            ..AuditMetadata::default()
        };

        f.service().confirm(&token, "org-1", Some(metadata.clone())).unwrap();

        assert_eq!(f.sink.entries().unwrap()[0].entry.metadata, Some(metadata));
    }

    #[test]
    fn test_confirm_persists_to_disk() {
        let f = fixture();
        let token = f.tokens.issue("s1", "a1", Duration::hours(1)).unwrap();
        f.service().confirm(&token, "org-1", None).unwrap();

        let reloaded = ConfirmationStore::new(f._temp.path().join("confirmations.json"));
        reloaded.load().unwrap();
        assert!(reloaded.get("s1", "a1").unwrap().is_some());
    }

    #[test]
    fn test_failed_write_leaves_pair_confirmable() {
        let f = fixture();
        let path = f._temp.path().join("confirmations.json");
        let token = f.tokens.issue("s1", "a1", Duration::hours(1)).unwrap();
        fs::create_dir(temp_path(&path)).unwrap();

        assert!(f.service().confirm(&token, "org-1", None).is_err());
        assert!(f.sink.is_empty().unwrap());

        fs::remove_dir(temp_path(&path)).unwrap();
        let outcome = f.service().confirm(&token, "org-1", None).unwrap();

        assert!(matches!(outcome, ConfirmationOutcome::Confirmed(_)));
        assert_eq!(f.sink.len().unwrap(), 1);
    }

    #[test]
    fn test_services_sharing_a_file_confirm_once() {
        let f = fixture();
        let other_store = ConfirmationStore::new(f._temp.path().join("confirmations.json"));
        f.store.load().unwrap();
        other_store.load().unwrap();
        let other = AttendanceService::new(&f.tokens, &other_store, &f.audit);

        let same = f.tokens.issue("s1", "a1", Duration::hours(1)).unwrap();
        let different = f.tokens.issue("s1", "a2", Duration::hours(1)).unwrap();

        let first = f.service().confirm(&same, "org-1", None).unwrap();
        let second = other.confirm(&same, "org-1", None).unwrap();
        let third = other.confirm(&different, "org-1", None).unwrap();

        assert!(matches!(first, ConfirmationOutcome::Confirmed(_)));
        assert!(matches!(second, ConfirmationOutcome::AlreadyConfirmed(_)));
        assert!(matches!(third, ConfirmationOutcome::Confirmed(_)));
        // One audit row per pair
        assert_eq!(f.sink.len().unwrap(), 2);

        f.store.load().unwrap();
        assert_eq!(f.store.count().unwrap(), 2);
    }

    #[test]
    fn test_empty_organization_rejected() {
        let f = fixture();
        let token = f.tokens.issue("s1", "a1", Duration::hours(1)).unwrap();
        let err = f.service().confirm(&token, "  ", None).unwrap_err();
        assert!(err.is_validation());
    }
}
