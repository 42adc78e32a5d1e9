use thiserror::Error;

use crate::model::GroupKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Occurrence not found: {0}")]
    UnknownOccurrence(String),

    #[error("Group not found: {0}")]
    UnknownGroup(GroupKey),

    #[error("Accepting group {0} requires an original snapshot")]
    MissingSnapshot(GroupKey),

    #[error("Invalid detection result: {0}")]
    Detection(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
