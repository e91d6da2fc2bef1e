//! Book regions: per-column runs of lines belonging to one book.

use super::columns::ColumnLayout;
use crate::model::BookMarker;

/// A book start expressed as a wrapped-line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBookMarker {
    /// Book index.
    pub book_index: usize,
    /// First wrapped line of the book.
    pub line_index: usize,
}

/// Maximal run of lines in one column belonging to one book.
///
/// `start_line` and `end_line` are column-relative rows, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookRegion {
    /// Book index.
    pub book_index: usize,
    /// First row (inclusive).
    pub start_line: usize,
    /// Last row (inclusive).
    pub end_line: usize,
    /// Column holding the region.
    pub column: usize,
}

impl BookRegion {
    /// Number of rows covered (always at least one).
    pub fn row_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}

/// Convert verse-indexed book markers into line-indexed markers.
///
/// Markers pointing past the known verses are dropped. The result is
/// sorted by line index.
pub fn map_lines_to_books(markers: &[BookMarker], verse_start_lines: &[usize]) -> Vec<LineBookMarker> {
    let mut mapped: Vec<LineBookMarker> = markers
        .iter()
        .filter_map(|m| {
            verse_start_lines
                .get(m.verse_index)
                .map(|&line_index| LineBookMarker {
                    book_index: m.book_index,
                    line_index,
                })
        })
        .collect();
    mapped.sort_by_key(|m| m.line_index);
    mapped
}

/// Compute book regions for every column in one left-to-right scan.
///
/// Lines before the first marker belong to the first marker's book (book 0
/// when there are no markers). A column starting mid-book inherits the book
/// in effect at the end of the previous column.
pub fn calculate_book_regions(markers: &[LineBookMarker], columns: &ColumnLayout) -> Vec<BookRegion> {
    let mut regions = Vec::new();
    let mut current_book = markers.first().map_or(0, |m| m.book_index);
    let mut next_marker = 0usize;

    for (column, range) in columns.columns().iter().enumerate() {
        let mut open: Option<BookRegion> = None;

        for line in range.clone() {
            while next_marker < markers.len() && markers[next_marker].line_index <= line {
                current_book = markers[next_marker].book_index;
                next_marker += 1;
            }

            let row = line - range.start;
            match open.as_mut() {
                Some(region) if region.book_index == current_book => region.end_line = row,
                _ => {
                    if let Some(done) = open.take() {
                        regions.push(done);
                    }
                    open = Some(BookRegion {
                        book_index: current_book,
                        start_line: row,
                        end_line: row,
                        column,
                    });
                }
            }
        }

        if let Some(done) = open {
            regions.push(done);
        }
    }

    regions
}
