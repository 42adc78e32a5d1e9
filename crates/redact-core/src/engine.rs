//! Replacement engine - the only writer of substitutions into the buffer
//!
//! Every operation substitutes across the whole buffer, not just the span
//! that triggered it: once a value is redacted, all of its instances are.

use std::collections::HashSet;

use serde::Serialize;

use crate::buffer::TextBuffer;
use crate::matcher;
use crate::model::{GroupKey, Occurrence, ReviewStatus};
use crate::state::ReviewState;
use crate::Result;

/// Result of a single-group operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub group: GroupKey,
    pub status: ReviewStatus,
    /// Substitutions made in the buffer. Zero when the expected text was not
    /// found, e.g. after a raw edit removed it.
    pub replacements: usize,
}

/// Result of a bulk operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub groups: usize,
    pub replacements: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplacementEngine;

impl ReplacementEngine {
    pub fn new() -> Self {
        Self
    }

    /// Redact every instance of the occurrence's value and mark its group accepted
    pub fn accept(
        &self,
        buffer: &mut dyn TextBuffer,
        state: &mut ReviewState,
        occurrence: &Occurrence,
    ) -> Result<Outcome> {
        let group = &occurrence.group;
        let replacement = state
            .effective_replacement(group, &occurrence.suggested_replacement)
            .to_string();

        if state.status(group) == ReviewStatus::Pending
            && buffer.text().contains(replacement.as_str())
        {
            tracing::warn!(
                "Replacement for group {} already appears in the text; reverting it is ambiguous",
                group
            );
        }

        let replacements = substitute(buffer, &occurrence.original_value, &replacement);
        state.set_status(
            group,
            ReviewStatus::Accepted,
            Some(occurrence.original_value.clone()),
        )?;

        tracing::info!(
            "Accepted group {} ({}): {} replacements",
            group,
            occurrence.detected_type,
            replacements
        );

        Ok(Outcome {
            group: group.clone(),
            status: ReviewStatus::Accepted,
            replacements,
        })
    }

    /// Mark a group skipped. The buffer is not touched.
    ///
    /// Skipping an accepted group is a no-op: it would strand the redacted
    /// text without a way back. Revert it first.
    pub fn skip(&self, state: &mut ReviewState, occurrence: &Occurrence) -> Result<Outcome> {
        let group = &occurrence.group;
        let current = state.status(group);

        if current == ReviewStatus::Accepted {
            tracing::debug!("Ignoring skip of accepted group {}", group);
            return Ok(Outcome {
                group: group.clone(),
                status: current,
                replacements: 0,
            });
        }

        state.set_status(group, ReviewStatus::Skipped, None)?;
        tracing::info!("Skipped group {} ({})", group, occurrence.detected_type);

        Ok(Outcome {
            group: group.clone(),
            status: ReviewStatus::Skipped,
            replacements: 0,
        })
    }

    /// Undo a decision. Accepted groups get their original value restored
    /// everywhere; skipped groups just go back to pending.
    pub fn revert(
        &self,
        buffer: &mut dyn TextBuffer,
        state: &mut ReviewState,
        occurrence: &Occurrence,
    ) -> Result<Outcome> {
        let group = &occurrence.group;

        let replacements = match state.status(group) {
            ReviewStatus::Pending => {
                tracing::debug!("Nothing to revert for pending group {}", group);
                return Ok(Outcome {
                    group: group.clone(),
                    status: ReviewStatus::Pending,
                    replacements: 0,
                });
            }
            ReviewStatus::Skipped => 0,
            ReviewStatus::Accepted => {
                let replacement = state
                    .effective_replacement(group, &occurrence.suggested_replacement)
                    .to_string();
                let original = state
                    .snapshot(group)
                    .unwrap_or(occurrence.original_value.as_str())
                    .to_string();
                substitute(buffer, &replacement, &original)
            }
        };

        state.set_status(group, ReviewStatus::Pending, None)?;
        tracing::info!("Reverted group {}: {} replacements", group, replacements);

        Ok(Outcome {
            group: group.clone(),
            status: ReviewStatus::Pending,
            replacements,
        })
    }

    /// Change a group's replacement text.
    ///
    /// For an accepted group the old replacement is swapped straight to the
    /// new one, so the original value never reappears. Blank text removes the
    /// override and falls back to the suggested replacement.
    pub fn edit_replacement(
        &self,
        buffer: &mut dyn TextBuffer,
        state: &mut ReviewState,
        occurrence: &Occurrence,
        new_text: &str,
    ) -> Result<Outcome> {
        let group = &occurrence.group;
        let status = state.status(group);
        let old = state
            .effective_replacement(group, &occurrence.suggested_replacement)
            .to_string();

        if new_text.trim().is_empty() {
            state.clear_custom_replacement(group);
        } else {
            state.set_custom_replacement(group, new_text);
        }
        let new = state
            .effective_replacement(group, &occurrence.suggested_replacement)
            .to_string();

        let replacements = if status == ReviewStatus::Accepted && old != new {
            substitute(buffer, &old, &new)
        } else {
            0
        };

        tracing::info!("Edited replacement for group {}: {} replacements", group, replacements);

        Ok(Outcome {
            group: group.clone(),
            status,
            replacements,
        })
    }

    /// Accept every group that still shows an original value, once each, in
    /// first-seen order: pending groups, and accepted groups whose value
    /// came back through a raw edit
    pub fn apply_all(
        &self,
        buffer: &mut dyn TextBuffer,
        state: &mut ReviewState,
        occurrences: &[Occurrence],
    ) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        let mut handled = HashSet::new();
        for occurrence in occurrences {
            if handled.contains(&occurrence.group) || !needs_redaction(state, occurrence) {
                continue;
            }
            handled.insert(occurrence.group.clone());
            outcome.replacements += self.accept(buffer, state, occurrence)?.replacements;
            outcome.groups += 1;
        }
        Ok(outcome)
    }

    /// Skip every pending group, in first-seen order
    pub fn skip_all(&self, state: &mut ReviewState, occurrences: &[Occurrence]) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for occurrence in first_per_group(occurrences) {
            if state.status(&occurrence.group) == ReviewStatus::Pending {
                self.skip(state, occurrence)?;
                outcome.groups += 1;
            }
        }
        Ok(outcome)
    }

    /// Revert every decided group, in first-seen order.
    ///
    /// Assumes no two groups share original or replacement text.
    pub fn revert_all(
        &self,
        buffer: &mut dyn TextBuffer,
        state: &mut ReviewState,
        occurrences: &[Occurrence],
    ) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for occurrence in first_per_group(occurrences) {
            if state.status(&occurrence.group).is_decided() {
                outcome.replacements += self.revert(buffer, state, occurrence)?.replacements;
                outcome.groups += 1;
            }
        }
        Ok(outcome)
    }
}

/// The occurrence shows its original value and its group is not skipped
pub fn needs_redaction(state: &ReviewState, occurrence: &Occurrence) -> bool {
    match state.status(&occurrence.group) {
        ReviewStatus::Pending => true,
        ReviewStatus::Accepted => !occurrence.is_redacted(),
        ReviewStatus::Skipped => false,
    }
}

/// First occurrence of each group, preserving list order
pub fn first_per_group(occurrences: &[Occurrence]) -> Vec<&Occurrence> {
    let mut seen = HashSet::new();
    occurrences
        .iter()
        .filter(|o| seen.insert(&o.group))
        .collect()
}

fn substitute(buffer: &mut dyn TextBuffer, from: &str, to: &str) -> usize {
    let (text, count) = matcher::replace_all(&buffer.text(), from, to);
    if count > 0 {
        buffer.set_text(text);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StringBuffer;
    use crate::extract::Extractor;
    use crate::model::{ConfidenceLevel, DetectionResult, Suggestion};

    const TEXT: &str = "a: x@y.com\nb: x@y.com";

    fn extract(buffer: &StringBuffer, state: &ReviewState, suggestions: Vec<Suggestion>) -> Vec<Occurrence> {
        Extractor::default()
            .extract(
                &DetectionResult::new(ConfidenceLevel::High, suggestions),
                buffer.as_str(),
                state,
            )
            .occurrences
    }

    fn email() -> Vec<Suggestion> {
        vec![Suggestion::new("Email", "Email address", &["x@y.com"])]
    }

    #[test]
    fn test_accept_redacts_every_instance() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        let outcome = engine.accept(&mut buffer, &mut state, &occurrences[1]).unwrap();

        assert_eq!(outcome.replacements, 2);
        assert_eq!(buffer.as_str(), "a: user@example.com\nb: user@example.com");
        assert_eq!(state.status(&occurrences[0].group), ReviewStatus::Accepted);
        assert_eq!(state.snapshot(&occurrences[0].group), Some("x@y.com"));
    }

    #[test]
    fn test_accept_then_revert_round_trips() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        let outcome = engine.revert(&mut buffer, &mut state, &occurrences[0]).unwrap();

        assert_eq!(outcome.replacements, 2);
        assert_eq!(buffer.as_str(), TEXT);
        assert_eq!(state.status(&occurrences[0].group), ReviewStatus::Pending);
        assert_eq!(state.snapshot(&occurrences[0].group), None);
    }

    #[test]
    fn test_edit_while_accepted_swaps_directly() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        let writes = buffer.revision();
        engine
            .edit_replacement(&mut buffer, &mut state, &occurrences[0], "REDACTED")
            .unwrap();

        assert_eq!(buffer.as_str(), "a: REDACTED\nb: REDACTED");
        // one write: never passes back through the original value
        assert_eq!(buffer.revision(), writes + 1);

        engine.revert(&mut buffer, &mut state, &occurrences[0]).unwrap();
        assert_eq!(buffer.as_str(), TEXT);
        assert_eq!(state.custom_replacement(&occurrences[0].group), Some("REDACTED"));
    }

    #[test]
    fn test_edit_while_pending_only_records() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        let outcome = engine
            .edit_replacement(&mut buffer, &mut state, &occurrences[0], "[EMAIL]")
            .unwrap();
        assert_eq!(outcome.replacements, 0);
        assert_eq!(buffer.as_str(), TEXT);

        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        assert_eq!(buffer.as_str(), "a: [EMAIL]\nb: [EMAIL]");
    }

    #[test]
    fn test_blank_edit_restores_suggestion() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine
            .edit_replacement(&mut buffer, &mut state, &occurrences[0], "[EMAIL]")
            .unwrap();
        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        engine
            .edit_replacement(&mut buffer, &mut state, &occurrences[0], "  ")
            .unwrap();

        assert_eq!(buffer.as_str(), "a: user@example.com\nb: user@example.com");
        assert_eq!(state.custom_replacement(&occurrences[0].group), None);
    }

    #[test]
    fn test_skip_leaves_buffer_alone() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine.skip(&mut state, &occurrences[0]).unwrap();
        assert_eq!(buffer.as_str(), TEXT);
        assert_eq!(state.status(&occurrences[0].group), ReviewStatus::Skipped);

        let outcome = engine.revert(&mut buffer, &mut state, &occurrences[0]).unwrap();
        assert_eq!(outcome.replacements, 0);
        assert_eq!(state.status(&occurrences[0].group), ReviewStatus::Pending);
        assert_eq!(buffer.revision(), 0);
    }

    #[test]
    fn test_skip_of_accepted_group_is_ignored() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        let outcome = engine.skip(&mut state, &occurrences[0]).unwrap();
        assert_eq!(outcome.status, ReviewStatus::Accepted);
        assert_eq!(state.snapshot(&occurrences[0].group), Some("x@y.com"));
    }

    #[test]
    fn test_revert_of_stale_text_reports_zero() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        buffer.set_text("hand edited".to_string());

        let outcome = engine.revert(&mut buffer, &mut state, &occurrences[0]).unwrap();
        assert_eq!(outcome.replacements, 0);
        assert_eq!(buffer.as_str(), "hand edited");
        assert_eq!(state.status(&occurrences[0].group), ReviewStatus::Pending);
    }

    #[test]
    fn test_revert_pending_is_noop() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new(TEXT);
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        let outcome = engine.revert(&mut buffer, &mut state, &occurrences[0]).unwrap();
        assert_eq!(outcome.replacements, 0);
        assert_eq!(outcome.status, ReviewStatus::Pending);
    }

    #[test]
    fn test_apply_all_matches_sequential_accepts() {
        let engine = ReplacementEngine::new();
        let text = "Bob x@y.com\nAnn Bob";
        let suggestions = || {
            vec![
                Suggestion::new("Email", "", &["x@y.com"]),
                Suggestion::new("Name", "", &["Bob", "Ann"]),
            ]
        };

        let mut bulk_buffer = StringBuffer::new(text);
        let mut bulk_state = ReviewState::new();
        let occurrences = extract(&bulk_buffer, &bulk_state, suggestions());
        let outcome = engine
            .apply_all(&mut bulk_buffer, &mut bulk_state, &occurrences)
            .unwrap();
        assert_eq!(outcome.groups, 3);
        assert_eq!(outcome.replacements, 4);

        let mut seq_buffer = StringBuffer::new(text);
        let mut seq_state = ReviewState::new();
        for occurrence in first_per_group(&occurrences) {
            engine.accept(&mut seq_buffer, &mut seq_state, occurrence).unwrap();
        }

        assert_eq!(bulk_buffer.as_str(), seq_buffer.as_str());
        assert_eq!(bulk_buffer.as_str(), "[NAME] user@example.com\n[NAME] [NAME]");
    }

    #[test]
    fn test_apply_all_skips_decided_groups() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new("Bob x@y.com");
        let mut state = ReviewState::new();
        let occurrences = extract(
            &buffer,
            &state,
            vec![
                Suggestion::new("Email", "", &["x@y.com"]),
                Suggestion::new("Name", "", &["Bob"]),
            ],
        );

        engine.skip(&mut state, &occurrences[0]).unwrap();
        let outcome = engine.apply_all(&mut buffer, &mut state, &occurrences).unwrap();

        assert_eq!(outcome.groups, 1);
        assert_eq!(buffer.as_str(), "Bob user@example.com");
    }

    #[test]
    fn test_skip_all_and_revert_all() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new("Bob x@y.com");
        let mut state = ReviewState::new();
        let occurrences = extract(
            &buffer,
            &state,
            vec![
                Suggestion::new("Email", "", &["x@y.com"]),
                Suggestion::new("Name", "", &["Bob"]),
            ],
        );

        engine.accept(&mut buffer, &mut state, &occurrences[1]).unwrap();
        let skipped = engine.skip_all(&mut state, &occurrences).unwrap();
        assert_eq!(skipped.groups, 1);
        assert_eq!(state.status(&occurrences[0].group), ReviewStatus::Skipped);

        let reverted = engine.revert_all(&mut buffer, &mut state, &occurrences).unwrap();
        assert_eq!(reverted.groups, 2);
        assert_eq!(reverted.replacements, 1);
        assert_eq!(buffer.as_str(), "Bob x@y.com");
        assert!(state.is_empty());
    }

    #[test]
    fn test_accept_again_redacts_reappeared_value() {
        let engine = ReplacementEngine::new();
        let mut buffer = StringBuffer::new("a: x@y.com");
        let mut state = ReviewState::new();
        let occurrences = extract(&buffer, &state, email());

        engine.accept(&mut buffer, &mut state, &occurrences[0]).unwrap();
        buffer.set_text("a: user@example.com\nc: x@y.com".to_string());

        let occurrences = extract(&buffer, &state, email());
        assert!(!needs_redaction(&state, &occurrences[0]));
        assert!(needs_redaction(&state, &occurrences[1]));

        let outcome = engine.apply_all(&mut buffer, &mut state, &occurrences).unwrap();
        assert_eq!(outcome.groups, 1);
        assert_eq!(outcome.replacements, 1);
        assert_eq!(buffer.as_str(), "a: user@example.com\nc: user@example.com");
        assert_eq!(state.snapshot(&occurrences[0].group), Some("x@y.com"));
    }
}
