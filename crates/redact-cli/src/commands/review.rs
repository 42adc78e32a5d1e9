use anyhow::Result;
use redact_config::Config;
use redact_tui::App;
use std::path::PathBuf;

use super::{default_output, load_session};
use crate::cli::Inputs;

pub fn handle(inputs: &Inputs, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let session = load_session(inputs, config)?;
    let output = output.unwrap_or_else(|| default_output(&inputs.file));

    let mut app = App::new(session, config.layout.clone(), output);
    redact_tui::run(&mut app)?;

    let progress = app.session.progress();
    if app.is_dirty() {
        eprintln!(
            "Unsaved changes discarded ({} accepted, {} skipped, {} pending)",
            progress.accepted, progress.skipped, progress.pending
        );
    } else {
        eprintln!(
            "{} accepted, {} skipped, {} pending",
            progress.accepted, progress.skipped, progress.pending
        );
    }

    Ok(())
}
