//! Domain model: detection input, occurrence identities, review status

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Position-derived identity of one located fragment (`L{line}:C{column}`).
///
/// Unique within one extraction pass; not stable across buffer edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceKey(String);

impl OccurrenceKey {
    pub fn at(line: usize, column: usize) -> Self {
        Self(format!("L{}:C{}", line, column))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OccurrenceKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Value-derived identity shared by every occurrence of the same `(type, value)` pair.
///
/// Stable across edits and re-extractions: a decision made about one instance
/// applies to all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    const HEX_LEN: usize = 16;

    pub fn derive(detected_type: &str, value: &str) -> Self {
        let hash = blake3::hash(format!("{}:{}", detected_type, value).as_bytes());
        Self(hash.to_hex().as_str()[..Self::HEX_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

/// One classifier suggestion. Every field is optional on the wire; entries
/// without a title or examples are skipped during extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
}

impl Suggestion {
    pub fn new(title: &str, message: &str, examples: &[&str]) -> Self {
        Self {
            title: Some(title.to_string()),
            message: Some(message.to_string()),
            examples: Some(examples.iter().map(|e| e.to_string()).collect()),
        }
    }
}

/// Pre-computed classifier output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    #[serde(rename = "containsPHI")]
    pub contains_phi: bool,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub suggestions: Option<Vec<Suggestion>>,
    /// Suggestion entries that could not be decoded at all
    #[serde(skip)]
    pub malformed_entries: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDetection {
    #[serde(rename = "containsPHI", default)]
    contains_phi: bool,
    #[serde(default)]
    confidence_level: ConfidenceLevel,
    #[serde(default)]
    suggestions: Option<Vec<serde_json::Value>>,
}

impl DetectionResult {
    pub fn new(confidence_level: ConfidenceLevel, suggestions: Vec<Suggestion>) -> Self {
        Self {
            contains_phi: !suggestions.is_empty(),
            confidence_level,
            suggestions: Some(suggestions),
            malformed_entries: 0,
        }
    }

    /// Decode classifier JSON. Suggestion entries with the wrong shape are
    /// dropped and counted instead of failing the whole document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDetection = serde_json::from_str(json)?;

        let mut malformed_entries = 0;
        let suggestions = raw.suggestions.map(|values| {
            values
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<Suggestion>(value) {
                    Ok(suggestion) => Some(suggestion),
                    Err(e) => {
                        tracing::debug!("Dropping undecodable suggestion: {}", e);
                        malformed_entries += 1;
                        None
                    }
                })
                .collect()
        });

        Ok(Self {
            contains_phi: raw.contains_phi,
            confidence_level: raw.confidence_level,
            suggestions,
            malformed_entries,
        })
    }

    /// True when there is nothing to review
    pub fn is_clear(&self) -> bool {
        !self.contains_phi || self.suggestions.as_ref().is_none_or(|s| s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Accepted,
    Skipped,
}

impl ReviewStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Accepted => "accepted",
            ReviewStatus::Skipped => "skipped",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

/// One located fragment of sensitive text.
///
/// Columns are 1-based character offsets; `column_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    #[serde(rename = "occurrenceId")]
    pub key: OccurrenceKey,
    #[serde(rename = "groupId")]
    pub group: GroupKey,
    #[serde(rename = "lineNumber")]
    pub line: usize,
    pub column_start: usize,
    pub column_end: usize,
    pub original_value: String,
    /// Text currently occupying the span: the original value, or the
    /// replacement once the group has been accepted
    pub matched_text: String,
    pub detected_type: String,
    pub message: String,
    pub confidence_level: ConfidenceLevel,
    pub suggested_replacement: String,
}

impl Occurrence {
    pub fn is_redacted(&self) -> bool {
        self.matched_text != self.original_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_is_stable() {
        let a = GroupKey::derive("Email", "x@y.com");
        let b = GroupKey::derive("Email", "x@y.com");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_group_key_depends_on_type_and_value() {
        let email = GroupKey::derive("Email", "x@y.com");
        assert_ne!(email, GroupKey::derive("Name", "x@y.com"));
        assert_ne!(email, GroupKey::derive("Email", "x@y.co"));
    }

    #[test]
    fn test_occurrence_key_format() {
        assert_eq!(OccurrenceKey::at(2, 4).as_str(), "L2:C4");
    }

    #[test]
    fn test_detection_from_json() {
        let json = r#"{
            "containsPHI": true,
            "confidenceLevel": "high",
            "suggestions": [
                {"title": "Email", "message": "Email address", "examples": ["x@y.com"]},
                {"title": "Phone"},
                {"title": 42, "examples": "nope"}
            ]
        }"#;

        let detection = DetectionResult::from_json(json).unwrap();
        assert!(detection.contains_phi);
        assert_eq!(detection.confidence_level, ConfidenceLevel::High);
        assert_eq!(detection.suggestions.as_ref().unwrap().len(), 2);
        assert_eq!(detection.malformed_entries, 1);
        assert!(!detection.is_clear());
    }

    #[test]
    fn test_detection_without_suggestions_is_clear() {
        let detection = DetectionResult::from_json(r#"{"containsPHI": true}"#).unwrap();
        assert!(detection.is_clear());

        let detection = DetectionResult::from_json(r#"{"containsPHI": false, "suggestions": []}"#).unwrap();
        assert!(detection.is_clear());
    }

    #[test]
    fn test_detection_rejects_non_object() {
        assert!(DetectionResult::from_json("[1, 2]").is_err());
    }
}
