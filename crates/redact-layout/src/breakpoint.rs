//! Breakpoints and their weight tables

use serde::{Deserialize, Serialize};

/// Viewport width tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Compact,
    Medium,
    Wide,
}

impl Breakpoint {
    pub fn for_width(width: u32, thresholds: &BreakpointThresholds) -> Self {
        if width >= thresholds.wide_from {
            Breakpoint::Wide
        } else if width >= thresholds.medium_from {
            Breakpoint::Medium
        } else {
            Breakpoint::Compact
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Breakpoint::Compact => "compact",
            Breakpoint::Medium => "medium",
            Breakpoint::Wide => "wide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointThresholds {
    pub medium_from: u32,
    pub wide_from: u32,
}

impl Default for BreakpointThresholds {
    fn default() -> Self {
        Self {
            medium_from: 80,
            wide_from: 120,
        }
    }
}

/// A named column and its share of the width. Zero hides the column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWeight {
    pub name: String,
    pub weight: u32,
}

impl ColumnWeight {
    pub fn new(name: &str, weight: u32) -> Self {
        Self {
            name: name.to_string(),
            weight,
        }
    }
}

/// Columns in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    columns: Vec<ColumnWeight>,
}

impl WeightTable {
    pub fn new(columns: Vec<ColumnWeight>) -> Self {
        Self { columns }
    }

    /// Build from `(name, weight)` pairs
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        Self::new(pairs.iter().map(|(n, w)| ColumnWeight::new(n, *w)).collect())
    }

    pub fn columns(&self) -> &[ColumnWeight] {
        &self.columns
    }

    pub fn total_weight(&self) -> u64 {
        self.columns.iter().map(|c| u64::from(c.weight)).sum()
    }

    pub fn last_visible(&self) -> Option<usize> {
        self.columns.iter().rposition(|c| c.weight > 0)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One weight table per breakpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTables {
    pub compact: WeightTable,
    pub medium: WeightTable,
    pub wide: WeightTable,
}

impl LayoutTables {
    pub fn table(&self, breakpoint: Breakpoint) -> &WeightTable {
        match breakpoint {
            Breakpoint::Compact => &self.compact,
            Breakpoint::Medium => &self.medium,
            Breakpoint::Wide => &self.wide,
        }
    }
}

impl Default for LayoutTables {
    fn default() -> Self {
        Self {
            compact: WeightTable::from_pairs(&[
                ("position", 0),
                ("type", 0),
                ("value", 3),
                ("replacement", 3),
                ("status", 2),
                ("confidence", 0),
            ]),
            medium: WeightTable::from_pairs(&[
                ("position", 1),
                ("type", 2),
                ("value", 3),
                ("replacement", 3),
                ("status", 2),
                ("confidence", 0),
            ]),
            wide: WeightTable::from_pairs(&[
                ("position", 1),
                ("type", 2),
                ("value", 4),
                ("replacement", 4),
                ("status", 2),
                ("confidence", 1),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_for_width() {
        let thresholds = BreakpointThresholds::default();
        assert_eq!(Breakpoint::for_width(60, &thresholds), Breakpoint::Compact);
        assert_eq!(Breakpoint::for_width(80, &thresholds), Breakpoint::Medium);
        assert_eq!(Breakpoint::for_width(119, &thresholds), Breakpoint::Medium);
        assert_eq!(Breakpoint::for_width(200, &thresholds), Breakpoint::Wide);
    }

    #[test]
    fn test_default_tables_share_columns() {
        let tables = LayoutTables::default();
        let names = |t: &WeightTable| t.columns().iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&tables.compact), names(&tables.wide));
        assert_eq!(names(&tables.medium), names(&tables.wide));
    }

    #[test]
    fn test_last_visible_skips_hidden() {
        let table = WeightTable::from_pairs(&[("a", 1), ("b", 2), ("c", 0)]);
        assert_eq!(table.last_visible(), Some(1));
        assert_eq!(table.total_weight(), 3);
    }
}
