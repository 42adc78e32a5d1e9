use anyhow::{Context, Result};
use redact_config::Config;
use redact_core::{BulkOutcome, StringBuffer};
use redact_session::ReviewSession;
use std::path::Path;

use super::load_session;
use crate::cli::Inputs;

pub fn handle(inputs: &Inputs, output: Option<&Path>, audit: bool, config: &Config) -> Result<()> {
    let mut session = load_session(inputs, config)?;
    let outcome = redact(&mut session)?;

    match output {
        Some(path) => {
            std::fs::write(path, session.buffer().as_str())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "✓ Redacted {} groups ({} replacements) -> {}",
                outcome.groups,
                outcome.replacements,
                path.display()
            );
        }
        None => print!("{}", session.buffer().as_str()),
    }

    if audit {
        eprintln!("{}", serde_json::to_string_pretty(session.audit())?);
    }

    Ok(())
}

/// Accept every pending group in first-seen order
pub fn redact(session: &mut ReviewSession<StringBuffer>) -> Result<BulkOutcome> {
    let outcome = session.apply_all()?;
    let progress = session.progress();
    if !progress.is_resolved() && progress.unique_groups > 0 {
        tracing::warn!("{} groups still pending after apply", progress.pending);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::write_inputs;

    const DETECTIONS: &str = r#"{"containsPHI": true, "confidenceLevel": "high", "suggestions": [
        {"title": "Name", "message": "Patient name", "examples": ["Ann Lee"]},
        {"title": "Phone", "message": "Phone number", "examples": ["555-0100"]}
    ]}"#;

    #[test]
    fn test_apply_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path(), "Ann Lee, 555-0100\nAnn Lee", DETECTIONS);
        let output = dir.path().join("out.txt");

        handle(&inputs, Some(&output), false, &Config::default()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "[NAME], 555-555-5555\n[NAME]"
        );
        // input untouched
        assert_eq!(
            std::fs::read_to_string(&inputs.file).unwrap(),
            "Ann Lee, 555-0100\nAnn Lee"
        );
    }

    #[test]
    fn test_redact_uses_configured_replacements() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path(), "Ann Lee, 555-0100", DETECTIONS);
        let mut config = Config::default();
        config
            .replacements
            .types
            .insert("phone".to_string(), "[PHONE]".to_string());

        let mut session = load_session(&inputs, &config).unwrap();
        let outcome = redact(&mut session).unwrap();

        assert_eq!(outcome.groups, 2);
        assert_eq!(outcome.replacements, 2);
        assert_eq!(session.text(), "[NAME], [PHONE]");
        assert_eq!(session.audit().len(), 1);
    }
}
