use anyhow::Result;
use redact_config::Config;
use redact_core::{Occurrence, StringBuffer};
use redact_session::{Progress, ReviewSession};
use serde::Serialize;

use super::load_session;
use crate::cli::Inputs;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport<'a> {
    pub occurrences: &'a [Occurrence],
    pub progress: Progress,
    pub skipped_suggestions: usize,
}

impl<'a> ScanReport<'a> {
    pub fn new(session: &'a ReviewSession<StringBuffer>) -> Self {
        Self {
            occurrences: session.occurrences(),
            progress: session.progress(),
            skipped_suggestions: session.skipped_suggestions(),
        }
    }
}

pub fn handle(inputs: &Inputs, config: &Config) -> Result<()> {
    let session = load_session(inputs, config)?;
    let report = ScanReport::new(&session);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
