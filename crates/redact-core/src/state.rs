//! Review state store: per-group decisions that survive re-extraction

use std::collections::{HashMap, HashSet};

use crate::model::{GroupKey, ReviewStatus};
use crate::{Error, Result};

/// Decisions keyed by group.
///
/// A group with no status entry is pending. `snapshot` holds the original
/// value captured at acceptance and is only removed when the group returns
/// to pending.
#[derive(Debug, Clone, Default)]
pub struct ReviewState {
    status: HashMap<GroupKey, ReviewStatus>,
    custom: HashMap<GroupKey, String>,
    snapshot: HashMap<GroupKey, String>,
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, group: &GroupKey) -> ReviewStatus {
        self.status.get(group).copied().unwrap_or_default()
    }

    pub fn custom_replacement(&self, group: &GroupKey) -> Option<&str> {
        self.custom.get(group).map(String::as_str)
    }

    pub fn snapshot(&self, group: &GroupKey) -> Option<&str> {
        self.snapshot.get(group).map(String::as_str)
    }

    /// Custom override if present, else the suggested default
    pub fn effective_replacement<'a>(&'a self, group: &GroupKey, suggested: &'a str) -> &'a str {
        self.custom_replacement(group).unwrap_or(suggested)
    }

    /// Set a group's status.
    ///
    /// Accepting requires a snapshot unless one was already captured; an
    /// existing snapshot is never overwritten. Returning to pending clears it.
    pub fn set_status(
        &mut self,
        group: &GroupKey,
        status: ReviewStatus,
        snapshot: Option<String>,
    ) -> Result<()> {
        match status {
            ReviewStatus::Accepted => {
                if !self.snapshot.contains_key(group) {
                    let original = snapshot.ok_or_else(|| Error::MissingSnapshot(group.clone()))?;
                    self.snapshot.insert(group.clone(), original);
                }
                self.status.insert(group.clone(), status);
            }
            ReviewStatus::Skipped => {
                self.status.insert(group.clone(), status);
            }
            ReviewStatus::Pending => {
                self.status.remove(group);
                self.snapshot.remove(group);
            }
        }
        Ok(())
    }

    pub fn set_custom_replacement(&mut self, group: &GroupKey, text: impl Into<String>) {
        self.custom.insert(group.clone(), text.into());
    }

    pub fn clear_custom_replacement(&mut self, group: &GroupKey) {
        self.custom.remove(group);
    }

    /// Keep only entries whose group is still live
    pub fn reconcile<'a>(&mut self, live: impl IntoIterator<Item = &'a GroupKey>) {
        let live: HashSet<&GroupKey> = live.into_iter().collect();
        let before = self.tracked_groups();

        self.status.retain(|k, _| live.contains(k));
        self.custom.retain(|k, _| live.contains(k));
        self.snapshot.retain(|k, _| live.contains(k));

        let dropped = before.saturating_sub(self.tracked_groups());
        if dropped > 0 {
            tracing::debug!("Reconcile dropped {} stale groups", dropped);
        }
    }

    pub fn clear(&mut self) {
        self.status.clear();
        self.custom.clear();
        self.snapshot.clear();
    }

    /// Number of groups with any recorded state
    pub fn tracked_groups(&self) -> usize {
        let mut keys: HashSet<&GroupKey> = self.status.keys().collect();
        keys.extend(self.custom.keys());
        keys.extend(self.snapshot.keys());
        keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.custom.is_empty() && self.snapshot.is_empty()
    }

    /// Accepted groups with their snapshot
    pub fn accepted(&self) -> impl Iterator<Item = (&GroupKey, &str)> {
        self.status
            .iter()
            .filter(|(_, status)| **status == ReviewStatus::Accepted)
            .filter_map(|(group, _)| self.snapshot(group).map(|s| (group, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> GroupKey {
        GroupKey::derive("Email", value)
    }

    #[test]
    fn test_default_is_pending() {
        let state = ReviewState::new();
        assert_eq!(state.status(&key("a")), ReviewStatus::Pending);
        assert!(state.is_empty());
    }

    #[test]
    fn test_accept_requires_snapshot() {
        let mut state = ReviewState::new();
        let group = key("a");

        assert!(state.set_status(&group, ReviewStatus::Accepted, None).is_err());
        assert_eq!(state.status(&group), ReviewStatus::Pending);

        state
            .set_status(&group, ReviewStatus::Accepted, Some("a".to_string()))
            .unwrap();
        assert_eq!(state.status(&group), ReviewStatus::Accepted);
        assert_eq!(state.snapshot(&group), Some("a"));
    }

    #[test]
    fn test_snapshot_is_not_overwritten() {
        let mut state = ReviewState::new();
        let group = key("a");

        state
            .set_status(&group, ReviewStatus::Accepted, Some("first".to_string()))
            .unwrap();
        state
            .set_status(&group, ReviewStatus::Accepted, Some("second".to_string()))
            .unwrap();
        assert_eq!(state.snapshot(&group), Some("first"));
    }

    #[test]
    fn test_pending_clears_snapshot_but_keeps_custom() {
        let mut state = ReviewState::new();
        let group = key("a");

        state.set_custom_replacement(&group, "REDACTED");
        state
            .set_status(&group, ReviewStatus::Accepted, Some("a".to_string()))
            .unwrap();
        state.set_status(&group, ReviewStatus::Pending, None).unwrap();

        assert_eq!(state.status(&group), ReviewStatus::Pending);
        assert_eq!(state.snapshot(&group), None);
        assert_eq!(state.custom_replacement(&group), Some("REDACTED"));
    }

    #[test]
    fn test_effective_replacement() {
        let mut state = ReviewState::new();
        let group = key("a");

        assert_eq!(state.effective_replacement(&group, "user@example.com"), "user@example.com");
        state.set_custom_replacement(&group, "REDACTED");
        assert_eq!(state.effective_replacement(&group, "user@example.com"), "REDACTED");
    }

    #[test]
    fn test_reconcile_keeps_live_and_drops_stale() {
        let mut state = ReviewState::new();
        let live = key("live");
        let stale = key("stale");

        state
            .set_status(&live, ReviewStatus::Accepted, Some("live".to_string()))
            .unwrap();
        state.set_custom_replacement(&live, "X");
        state.set_status(&stale, ReviewStatus::Skipped, None).unwrap();
        state.set_custom_replacement(&stale, "Y");

        state.reconcile([&live]);

        assert_eq!(state.status(&live), ReviewStatus::Accepted);
        assert_eq!(state.custom_replacement(&live), Some("X"));
        assert_eq!(state.snapshot(&live), Some("live"));
        assert_eq!(state.status(&stale), ReviewStatus::Pending);
        assert_eq!(state.custom_replacement(&stale), None);
        assert_eq!(state.tracked_groups(), 1);
    }

    #[test]
    fn test_clear() {
        let mut state = ReviewState::new();
        state.set_status(&key("a"), ReviewStatus::Skipped, None).unwrap();
        state.set_custom_replacement(&key("b"), "X");
        state.clear();
        assert!(state.is_empty());
    }
}
