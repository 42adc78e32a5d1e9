//! Bridge to the external editing surface

use redact_core::{GroupKey, Occurrence, OccurrenceKey, ReviewStatus};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Editing surface unavailable")]
    Unavailable,
}

/// Span and metadata the host needs to draw a marker or tooltip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(rename = "occurrenceId")]
    pub key: OccurrenceKey,
    #[serde(rename = "groupId")]
    pub group: GroupKey,
    #[serde(rename = "lineNumber")]
    pub line: usize,
    pub column_start: usize,
    pub column_end: usize,
    pub detected_type: String,
    pub message: String,
    pub suggested_replacement: String,
    pub effective_replacement: String,
    pub status: ReviewStatus,
}

impl Marker {
    pub fn new(occurrence: &Occurrence, status: ReviewStatus, effective_replacement: &str) -> Self {
        Self {
            key: occurrence.key.clone(),
            group: occurrence.group.clone(),
            line: occurrence.line,
            column_start: occurrence.column_start,
            column_end: occurrence.column_end,
            detected_type: occurrence.detected_type.clone(),
            message: occurrence.message.clone(),
            suggested_replacement: occurrence.suggested_replacement.clone(),
            effective_replacement: effective_replacement.to_string(),
            status,
        }
    }
}

/// The editing surface that renders the buffer.
///
/// Commands are fire-and-forget: a failing host never blocks a review
/// operation, the command is just dropped.
pub trait EditorHost {
    /// Scroll to and focus an occurrence
    fn reveal(&mut self, occurrence: &Occurrence) -> Result<(), HostError>;

    /// Replace every marker after a re-extraction
    fn publish_markers(&mut self, markers: &[Marker]) -> Result<(), HostError>;
}
