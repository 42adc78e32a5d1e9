//! Display ordering. Sorting never changes identity: decisions stay keyed by
//! group and occurrence regardless of the order shown.

use std::cmp::Ordering;

use redact_core::{Occurrence, ReviewState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Position,
    Type,
    Value,
    Replacement,
    Status,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Position => "position",
            SortKey::Type => "type",
            SortKey::Value => "value",
            SortKey::Replacement => "replacement",
            SortKey::Status => "status",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortKey::Position => SortKey::Type,
            SortKey::Type => SortKey::Value,
            SortKey::Value => SortKey::Replacement,
            SortKey::Replacement => SortKey::Status,
            SortKey::Status => SortKey::Position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Indices into `occurrences` in display order. Ties fall back to position.
pub fn display_order(occurrences: &[Occurrence], order: SortOrder, state: &ReviewState) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..occurrences.len()).collect();

    indices.sort_by(|&a, &b| {
        let (a, b) = (&occurrences[a], &occurrences[b]);
        let primary = compare(a, b, order.key, state);
        let primary = match order.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| (a.line, a.column_start).cmp(&(b.line, b.column_start)))
    });

    indices
}

fn compare(a: &Occurrence, b: &Occurrence, key: SortKey, state: &ReviewState) -> Ordering {
    match key {
        SortKey::Position => (a.line, a.column_start).cmp(&(b.line, b.column_start)),
        SortKey::Type => a.detected_type.cmp(&b.detected_type),
        SortKey::Value => a.original_value.cmp(&b.original_value),
        SortKey::Replacement => state
            .effective_replacement(&a.group, &a.suggested_replacement)
            .cmp(state.effective_replacement(&b.group, &b.suggested_replacement)),
        SortKey::Status => state.status(&a.group).cmp(&state.status(&b.group)),
    }
}
