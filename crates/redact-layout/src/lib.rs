//! Column layout for the review table
//!
//! Proportional width allocation per breakpoint, plus resize of one column
//! against its neighbour with the total width conserved.

pub mod allocate;
pub mod breakpoint;
pub mod error;

pub use allocate::ColumnLayout;
pub use breakpoint::{Breakpoint, BreakpointThresholds, ColumnWeight, LayoutTables, WeightTable};
pub use error::{LayoutError, Result};
