//! Occurrence extraction
//!
//! Turns classifier suggestions plus the current buffer text into located
//! occurrences. Extraction is always a full recomputation; review decisions
//! are carried over by group key, never by position.

use std::collections::{HashMap, HashSet};

use crate::catalog::ReplacementCatalog;
use crate::matcher::{self, LineMatch};
use crate::model::{DetectionResult, GroupKey, Occurrence, OccurrenceKey, ReviewStatus};
use crate::state::ReviewState;

/// A group with at least one match in the current text
#[derive(Debug, Clone, PartialEq)]
pub struct LiveGroup {
    pub group: GroupKey,
    /// First match found for the group, even when an earlier suggestion
    /// claimed its position
    pub first: Occurrence,
    /// How many entries of `Extraction::occurrences` belong to the group.
    /// Zero when every position was claimed by another group.
    pub visible: usize,
}

impl LiveGroup {
    pub fn is_shadowed(&self) -> bool {
        self.visible == 0
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Occurrences ordered by line, then column
    pub occurrences: Vec<Occurrence>,
    /// Every group with at least one match, in first-seen order
    pub groups: Vec<LiveGroup>,
    /// Suggestions without a title or examples
    pub skipped_suggestions: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn live_groups(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.iter().map(|g| &g.group)
    }
}

pub struct Extractor {
    catalog: ReplacementCatalog,
}

impl Extractor {
    pub fn new(catalog: ReplacementCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ReplacementCatalog {
        &self.catalog
    }

    /// Locate every example of every suggestion in `text`.
    ///
    /// An accepted group is also located by its effective replacement, so it
    /// stays live (and revertible) after its original value is gone. Raw
    /// instances of the original that reappear are still indexed and remain
    /// unredacted until accepted again.
    pub fn extract(&self, detection: &DetectionResult, text: &str, state: &ReviewState) -> Extraction {
        let mut extraction = Extraction {
            skipped_suggestions: detection.malformed_entries,
            ..Default::default()
        };

        if detection.is_clear() {
            return extraction;
        }

        let mut seen_positions: HashSet<OccurrenceKey> = HashSet::new();
        let mut seen_groups: HashSet<GroupKey> = HashSet::new();

        for suggestion in detection.suggestions.iter().flatten() {
            let (Some(title), Some(examples)) = (&suggestion.title, &suggestion.examples) else {
                tracing::debug!("Skipping suggestion without title or examples");
                extraction.skipped_suggestions += 1;
                continue;
            };
            if title.trim().is_empty() {
                extraction.skipped_suggestions += 1;
                continue;
            }

            let message = suggestion.message.clone().unwrap_or_default();
            let suggested = self.catalog.suggest(title);

            for example in examples {
                if example.is_empty() {
                    continue;
                }

                let group = GroupKey::derive(title, example);
                let mut needles = Vec::with_capacity(2);
                if state.status(&group) == ReviewStatus::Accepted {
                    let replacement = state.effective_replacement(&group, suggested);
                    if replacement != example {
                        needles.push(replacement);
                    }
                }
                needles.push(example.as_str());

                // spans of this group already located; an original inside its
                // own replacement is not a second match
                let mut located: Vec<LineMatch> = Vec::new();

                for needle in needles {
                    for m in matcher::find_in_lines(text, needle) {
                        if located.iter().any(|l| overlaps(l, &m)) {
                            continue;
                        }
                        located.push(m);

                        let occurrence = Occurrence {
                            key: OccurrenceKey::at(m.line, m.column_start),
                            group: group.clone(),
                            line: m.line,
                            column_start: m.column_start,
                            column_end: m.column_end,
                            original_value: example.clone(),
                            matched_text: needle.to_string(),
                            detected_type: title.clone(),
                            message: message.clone(),
                            confidence_level: detection.confidence_level,
                            suggested_replacement: suggested.to_string(),
                        };

                        if seen_groups.insert(group.clone()) {
                            extraction.groups.push(LiveGroup {
                                group: group.clone(),
                                first: occurrence.clone(),
                                visible: 0,
                            });
                        }

                        // first suggestion to claim a position keeps it
                        if seen_positions.insert(occurrence.key.clone()) {
                            extraction.occurrences.push(occurrence);
                        }
                    }
                }
            }
        }

        extraction
            .occurrences
            .sort_by_key(|o| (o.line, o.column_start));

        let mut visible: HashMap<&GroupKey, usize> = HashMap::new();
        for occurrence in &extraction.occurrences {
            *visible.entry(&occurrence.group).or_default() += 1;
        }
        let counts: Vec<usize> = extraction
            .groups
            .iter()
            .map(|g| visible.get(&g.group).copied().unwrap_or(0))
            .collect();
        for (live, count) in extraction.groups.iter_mut().zip(counts) {
            live.visible = count;
        }

        tracing::debug!(
            "Extracted {} occurrences in {} groups ({} suggestions skipped)",
            extraction.occurrences.len(),
            extraction.groups.len(),
            extraction.skipped_suggestions
        );

        extraction
    }
}

fn overlaps(a: &LineMatch, b: &LineMatch) -> bool {
    a.line == b.line && a.column_start < b.column_end && b.column_start < a.column_end
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ReplacementCatalog::default())
    }
}
