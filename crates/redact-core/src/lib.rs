//! Core domain models and logic for interactive PHI redaction
//!
//! This crate contains:
//! - Domain models (Occurrence, GroupKey, OccurrenceKey, DetectionResult)
//! - Occurrence extraction (detection suggestions + buffer text -> located spans)
//! - Review state store (per-group decisions, custom replacements, snapshots)
//! - Replacement engine (the single writer of buffer substitutions)

pub mod buffer;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod model;
pub mod state;

pub use buffer::{StringBuffer, TextBuffer};
pub use catalog::ReplacementCatalog;
pub use engine::{BulkOutcome, Outcome, ReplacementEngine, needs_redaction};
pub use error::{Error, Result};
pub use extract::{Extraction, Extractor, LiveGroup};
pub use model::{
    ConfidenceLevel, DetectionResult, GroupKey, Occurrence, OccurrenceKey, ReviewStatus,
    Suggestion,
};
pub use state::ReviewState;
