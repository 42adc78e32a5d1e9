//! Default replacement text per detected type

use std::collections::BTreeMap;

const FALLBACK: &str = "[REDACTED]";

/// Maps a detected type (suggestion title) to its suggested replacement.
/// Lookups ignore ASCII case.
#[derive(Debug, Clone)]
pub struct ReplacementCatalog {
    entries: BTreeMap<String, String>,
    fallback: String,
}

impl ReplacementCatalog {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with_entry(mut self, detected_type: &str, replacement: impl Into<String>) -> Self {
        self.insert(detected_type, replacement);
        self
    }

    pub fn insert(&mut self, detected_type: &str, replacement: impl Into<String>) {
        self.entries
            .insert(detected_type.to_ascii_lowercase(), replacement.into());
    }

    pub fn suggest(&self, detected_type: &str) -> &str {
        self.entries
            .get(&detected_type.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Entries keyed by lowercased type
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for ReplacementCatalog {
    fn default() -> Self {
        Self::new(FALLBACK)
            .with_entry("Email", "user@example.com")
            .with_entry("Phone", "555-555-5555")
            .with_entry("Name", "[NAME]")
            .with_entry("SSN", "XXX-XX-XXXX")
            .with_entry("Date", "[DATE]")
            .with_entry("Address", "[ADDRESS]")
            .with_entry("MRN", "[MRN]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entries() {
        let catalog = ReplacementCatalog::default();
        assert_eq!(catalog.suggest("Email"), "user@example.com");
        assert_eq!(catalog.suggest("email"), "user@example.com");
        assert_eq!(catalog.suggest("Blood type"), "[REDACTED]");
    }

    #[test]
    fn test_override_entry() {
        let catalog = ReplacementCatalog::default().with_entry("EMAIL", "***");
        assert_eq!(catalog.suggest("Email"), "***");
    }
}
