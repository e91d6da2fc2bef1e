//! Partitioning of wrapped lines into side-by-side columns.

use crate::config::ColumnDensity;
use std::ops::Range;

/// Whether the canvas shows the whole corpus or one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Every book laid out together.
    #[default]
    AllBooks,
    /// A single book (by book index).
    SingleBook(usize),
}

impl ViewMode {
    /// True for [`ViewMode::SingleBook`].
    pub fn is_single_book(&self) -> bool {
        matches!(self, Self::SingleBook(_))
    }
}

/// Column partition of the global line sequence.
///
/// Columns hold consecutive slices of `lines_per_column` lines, so the
/// global line index of row `r` in column `c` is `c * lines_per_column + r`.
///
/// # Invariants
/// - `num_columns >= 1`
/// - `lines_per_column * num_columns >= total_lines`
/// - `columns` are consecutive, non-overlapping and cover `0..total_lines`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    num_columns: usize,
    lines_per_column: usize,
    columns: Vec<Range<usize>>,
}

impl ColumnLayout {
    /// Choose a column count for `total_lines` under `density`.
    ///
    /// `num_columns = clamp(ceil(total / min_lines), 1, max_columns)` and
    /// `lines_per_column = ceil(total / num_columns)`.
    pub fn calculate(total_lines: usize, density: ColumnDensity) -> Self {
        let min_lines = density.min_lines_per_column.max(1);
        let max_columns = density.max_columns.max(1);

        let num_columns = total_lines.div_ceil(min_lines).clamp(1, max_columns);
        let lines_per_column = total_lines.div_ceil(num_columns);

        let columns = (0..num_columns)
            .map(|c| {
                let start = (c * lines_per_column).min(total_lines);
                let end = ((c + 1) * lines_per_column).min(total_lines);
                start..end
            })
            .collect();

        Self {
            num_columns,
            lines_per_column,
            columns,
        }
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Capacity of each column in lines.
    pub fn lines_per_column(&self) -> usize {
        self.lines_per_column
    }

    /// Global line ranges for every column.
    pub fn columns(&self) -> &[Range<usize>] {
        &self.columns
    }

    /// Global line range of `column` (empty for an unknown column).
    pub fn column_range(&self, column: usize) -> Range<usize> {
        self.columns.get(column).cloned().unwrap_or(0..0)
    }

    /// Lines belonging to `column`.
    pub fn column_lines<'a>(&self, lines: &'a [String], column: usize) -> &'a [String] {
        let range = self.column_range(column);
        lines.get(range).unwrap_or(&[])
    }

    /// `(column, row)` of a global line index.
    pub fn locate(&self, line_index: usize) -> Option<(usize, usize)> {
        if self.lines_per_column == 0 {
            return None;
        }
        let column = line_index / self.lines_per_column;
        let range = self.columns.get(column)?;
        range
            .contains(&line_index)
            .then(|| (column, line_index - range.start))
    }

    /// Global line index of `row` in `column`, if that row holds a line.
    pub fn line_at(&self, column: usize, row: usize) -> Option<usize> {
        let range = self.columns.get(column)?;
        let line = range.start + row;
        range.contains(&line).then_some(line)
    }
}
