use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Column index {index} out of range ({len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Weight table has no visible columns")]
    NoVisibleColumns,

    #[error("Viewport of {available} cells is narrower than the {required} the columns need")]
    TooNarrow { available: u32, required: u64 },
}
