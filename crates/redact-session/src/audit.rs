//! In-session audit trail. Entries live only as long as the session and
//! never carry the sensitive value itself.

use redact_core::{GroupKey, ReviewStatus};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Accept,
    Skip,
    Revert,
    EditReplacement,
    ApplyAll,
    SkipAll,
    RevertAll,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    #[serde(with = "time::serde::timestamp")]
    pub at: OffsetDateTime,
    pub action: AuditAction,
    /// Single-group actions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    pub groups: usize,
    pub replacements: usize,
}

/// Entries tagged with the session that produced them
#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
    session: Uuid,
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            entries: Vec::new(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn record_group(
        &mut self,
        action: AuditAction,
        group: &GroupKey,
        detected_type: &str,
        status: ReviewStatus,
        replacements: usize,
    ) {
        self.entries.push(AuditEntry {
            at: OffsetDateTime::now_utc(),
            action,
            group: Some(group.clone()),
            detected_type: Some(detected_type.to_string()),
            status: Some(status),
            groups: 1,
            replacements,
        });
    }

    pub fn record_bulk(&mut self, action: AuditAction, groups: usize, replacements: usize) {
        self.entries.push(AuditEntry {
            at: OffsetDateTime::now_utc(),
            action,
            group: None,
            detected_type: None,
            status: None,
            groups,
            replacements,
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_do_not_leak_values() {
        let mut log = AuditLog::new(Uuid::new_v4());
        let group = GroupKey::derive("Email", "x@y.com");
        log.record_group(AuditAction::Accept, &group, "Email", ReviewStatus::Accepted, 2);
        log.record_bulk(AuditAction::SkipAll, 3, 0);

        let json = serde_json::to_string(&log).unwrap();
        assert!(!json.contains("x@y.com"));
        assert!(json.contains("\"action\":\"accept\""));
        assert!(json.contains("\"action\":\"skip_all\""));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_log_carries_session_id() {
        let session = Uuid::new_v4();
        let mut log = AuditLog::new(session);
        log.record_bulk(AuditAction::ApplyAll, 1, 1);

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["session"], session.to_string());
        assert_eq!(json["entries"].as_array().unwrap().len(), 1);
    }
}
