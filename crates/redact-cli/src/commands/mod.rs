pub mod apply;
pub mod config;
pub mod review;
pub mod scan;

use anyhow::{Context, Result};
use redact_config::Config;
use redact_core::{DetectionResult, StringBuffer};
use redact_session::ReviewSession;
use std::path::{Path, PathBuf};

use crate::cli::Inputs;

/// Read the document and its classifier result into a fresh session
pub fn load_session(inputs: &Inputs, config: &Config) -> Result<ReviewSession<StringBuffer>> {
    let text = std::fs::read_to_string(&inputs.file)
        .with_context(|| format!("Failed to read {}", inputs.file.display()))?;
    let json = std::fs::read_to_string(&inputs.detections)
        .with_context(|| format!("Failed to read {}", inputs.detections.display()))?;
    let detection = DetectionResult::from_json(&json)
        .with_context(|| format!("Invalid detection result in {}", inputs.detections.display()))?;

    if detection.malformed_entries > 0 {
        tracing::warn!(
            "Ignored {} malformed suggestion entries in {}",
            detection.malformed_entries,
            inputs.detections.display()
        );
    }

    let mut session = ReviewSession::new(StringBuffer::new(text), config.replacements.catalog());
    session.set_detection(detection);

    tracing::info!(
        "{}: {} occurrences in {} groups",
        inputs.file.display(),
        session.occurrences().len(),
        session.progress().unique_groups
    );

    Ok(session)
}

/// `notes.txt` -> `notes.txt.redacted`
pub fn default_output(file: &Path) -> PathBuf {
    let mut name = file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".redacted");
    file.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn write_inputs(dir: &Path, text: &str, json: &str) -> Inputs {
        let file = dir.join("note.txt");
        let detections = dir.join("note.json");
        std::fs::write(&file, text).unwrap();
        std::fs::write(&detections, json).unwrap();
        Inputs { file, detections }
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("/tmp/notes.txt")),
            PathBuf::from("/tmp/notes.txt.redacted")
        );
    }

    #[test]
    fn test_load_session() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(
            dir.path(),
            "Bob called\nBob",
            r#"{"containsPHI": true, "confidenceLevel": "high",
                "suggestions": [{"title": "Name", "message": "name", "examples": ["Bob"]}]}"#,
        );

        let session = load_session(&inputs, &Config::default()).unwrap();
        assert_eq!(session.occurrences().len(), 2);
        assert_eq!(session.occurrences()[0].suggested_replacement, "[NAME]");
    }

    #[test]
    fn test_load_session_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = Inputs {
            file: dir.path().join("missing.txt"),
            detections: dir.path().join("missing.json"),
        };
        let Err(err) = load_session(&inputs, &Config::default()) else {
            panic!("expected load_session to fail for a missing file");
        };
        assert!(err.to_string().contains("missing.txt"));
    }
}
