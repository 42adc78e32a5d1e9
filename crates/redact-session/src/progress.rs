use redact_core::{LiveGroup, Occurrence, ReviewState, ReviewStatus};
use serde::Serialize;

/// Review counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub unique_groups: usize,
    pub occurrences: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub pending: usize,
    /// Occurrences of accepted groups that show the original value again
    pub unredacted: usize,
}

impl Progress {
    /// Counts every live group, including accepted groups whose positions
    /// another group claimed. A pending group with no visible occurrence
    /// has nothing left to review and is left out.
    pub fn compute(
        occurrences: &[Occurrence],
        groups: &[LiveGroup],
        state: &ReviewState,
    ) -> Self {
        let mut progress = Progress {
            occurrences: occurrences.len(),
            ..Default::default()
        };

        for live in groups {
            let status = state.status(&live.group);
            if live.is_shadowed() && status == ReviewStatus::Pending {
                continue;
            }
            progress.unique_groups += 1;
            match status {
                ReviewStatus::Accepted => progress.accepted += 1,
                ReviewStatus::Skipped => progress.skipped += 1,
                ReviewStatus::Pending => progress.pending += 1,
            }
        }

        progress.unredacted = occurrences
            .iter()
            .filter(|o| state.status(&o.group) == ReviewStatus::Accepted && !o.is_redacted())
            .count();

        progress
    }

    /// Every group has a decision and no accepted value shows in the clear
    pub fn is_resolved(&self) -> bool {
        self.unique_groups > 0 && self.pending == 0 && self.unredacted == 0
    }

    pub fn decided(&self) -> usize {
        self.accepted + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redact_core::{ConfidenceLevel, DetectionResult, Extractor, GroupKey, Suggestion};

    fn compute(text: &str, examples: &[&str], state: &ReviewState) -> Progress {
        let detection = DetectionResult::new(
            ConfidenceLevel::High,
            vec![Suggestion::new("Email", "Email address", examples)],
        );
        let extraction = Extractor::default().extract(&detection, text, state);
        Progress::compute(&extraction.occurrences, &extraction.groups, state)
    }

    #[test]
    fn test_counts_groups_and_occurrences() {
        let progress = compute(
            "a@b.com c@d.com a@b.com",
            &["a@b.com", "c@d.com"],
            &ReviewState::new(),
        );

        assert_eq!(progress.unique_groups, 2);
        assert_eq!(progress.occurrences, 3);
        assert_eq!(progress.pending, 2);
        assert!(!progress.is_resolved());
    }

    #[test]
    fn test_reappeared_original_blocks_resolution() {
        let mut state = ReviewState::new();
        let group = GroupKey::derive("Email", "a@b.com");
        state
            .set_status(&group, ReviewStatus::Accepted, Some("a@b.com".to_string()))
            .unwrap();

        let progress = compute("user@example.com\na@b.com", &["a@b.com"], &state);

        assert_eq!(progress.accepted, 1);
        assert_eq!(progress.unredacted, 1);
        assert!(!progress.is_resolved());

        let progress = compute("user@example.com", &["a@b.com"], &state);
        assert_eq!(progress.unredacted, 0);
        assert!(progress.is_resolved());
    }

    #[test]
    fn test_serializes_camel_case() {
        let progress = compute("a@b.com", &["a@b.com"], &ReviewState::new());
        let json = serde_json::to_value(progress).unwrap();

        assert_eq!(json["uniqueGroups"], 1);
        assert!(json.get("unique_groups").is_none());
    }
}
