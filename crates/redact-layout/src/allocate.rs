//! Proportional width allocation and neighbour-compensated resize

use crate::breakpoint::WeightTable;
use crate::{LayoutError, Result};

/// Concrete column widths for one viewport width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    names: Vec<String>,
    widths: Vec<u32>,
    min_width: u32,
}

impl ColumnLayout {
    /// Distribute `available` across the table's columns.
    ///
    /// Each visible column gets `round(weight / total * available)`, raised to
    /// `min_width`. Whatever rounding leaves over (or overshoots) goes to the
    /// last visible column in declaration order. If that leaves the last
    /// column under the minimum, the shortfall is taken back from earlier
    /// columns, nearest first, so every visible column keeps `min_width`.
    pub fn allocate(table: &WeightTable, available: u32, min_width: u32) -> Result<Self> {
        let total = table.total_weight();
        let last_visible = table.last_visible().ok_or(LayoutError::NoVisibleColumns)?;

        let visible = table.columns().iter().filter(|c| c.weight > 0).count();
        let required = u64::from(min_width) * visible as u64;
        if required > u64::from(available) {
            tracing::debug!(
                "Viewport {} too narrow for {} columns at minimum {}",
                available,
                visible,
                min_width
            );
            return Err(LayoutError::TooNarrow {
                available,
                required,
            });
        }

        let mut widths: Vec<u32> = table
            .columns()
            .iter()
            .map(|column| {
                if column.weight == 0 {
                    return 0;
                }
                let share = f64::from(column.weight) / total as f64 * f64::from(available);
                (share.round() as u32).max(min_width)
            })
            .collect();

        let allocated: i64 = widths.iter().map(|w| i64::from(*w)).sum();
        let remainder = i64::from(available) - allocated;
        let adjusted = i64::from(widths[last_visible]) + remainder;

        let mut deficit = i64::from(min_width) - adjusted;
        widths[last_visible] = adjusted.max(i64::from(min_width)) as u32;
        for width in widths[..last_visible].iter_mut().rev() {
            if deficit <= 0 {
                break;
            }
            if *width == 0 {
                continue;
            }
            let taken = deficit.min(i64::from(width.saturating_sub(min_width)));
            *width -= taken as u32;
            deficit -= taken;
        }

        Ok(Self {
            names: table.columns().iter().map(|c| c.name.clone()).collect(),
            widths,
            min_width,
        })
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn width_of(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| self.widths[index])
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.widths.get(index).is_some_and(|w| *w > 0)
    }

    /// Visible columns as `(index, name, width)`
    pub fn visible(&self) -> impl Iterator<Item = (usize, &str, u32)> {
        self.names
            .iter()
            .zip(&self.widths)
            .enumerate()
            .filter(|(_, (_, w))| **w > 0)
            .map(|(i, (n, w))| (i, n.as_str(), *w))
    }

    pub fn total(&self) -> u32 {
        self.widths.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Grow (positive) or shrink (negative) column `index` by `delta`,
    /// mirroring the change into its neighbour: the next column, or the
    /// previous one for the last column.
    ///
    /// Neither column is pushed below the minimum; the delta is capped
    /// instead. Returns the delta actually applied. Resizing a hidden column
    /// or against a hidden neighbour applies nothing.
    pub fn resize(&mut self, index: usize, delta: i32) -> Result<i32> {
        let len = self.widths.len();
        if index >= len {
            return Err(LayoutError::ColumnOutOfRange { index, len });
        }

        let neighbour = if index + 1 < len {
            index + 1
        } else if index > 0 {
            index - 1
        } else {
            return Ok(0);
        };

        let own = self.widths[index];
        let other = self.widths[neighbour];
        if own == 0 || other == 0 {
            return Ok(0);
        }

        let applied = if delta >= 0 {
            delta.min(headroom(other, self.min_width))
        } else {
            -delta.saturating_abs().min(headroom(own, self.min_width))
        };

        self.widths[index] = (i64::from(own) + i64::from(applied)) as u32;
        self.widths[neighbour] = (i64::from(other) - i64::from(applied)) as u32;

        Ok(applied)
    }
}

/// How far a column can shrink before hitting the minimum
fn headroom(width: u32, min_width: u32) -> i32 {
    width.saturating_sub(min_width).min(i32::MAX as u32) as i32
}
