//! Text layout engine.
//!
//! Verses are wrapped into fixed-width lines ([`wrap`]), lines are split into
//! columns ([`columns`]) and each column is divided into book regions
//! ([`books`]). [`CorpusLayout`] bundles the three for the controller.

pub mod books;
pub mod columns;
pub mod wrap;

pub use books::{calculate_book_regions, map_lines_to_books, BookRegion, LineBookMarker};
pub use columns::{ColumnLayout, ViewMode};
pub use wrap::{wrap, wrap_with_progress, LineWrapper, TextLayout, WrapProgress};

use crate::config::LayoutConfig;
use crate::model::Corpus;
use tracing::{debug, info};

/// Everything derived from the corpus at initialization.
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    /// Wrapped lines and verse ↔ line maps.
    pub text: TextLayout,
    /// Column partition.
    pub columns: ColumnLayout,
    /// Book regions per column.
    pub regions: Vec<BookRegion>,
}

impl CorpusLayout {
    /// Lay out `corpus` for `mode`.
    pub fn build(corpus: &Corpus, config: &LayoutConfig, mode: ViewMode) -> Self {
        let texts: Vec<&str> = corpus.verses().iter().map(|v| v.text.as_str()).collect();

        let text = wrap_with_progress(
            &texts,
            config.line_width,
            config.wrap_batch_size,
            |done, total| debug!(done, total, "Wrapping verses"),
        );

        let density = if mode.is_single_book() {
            config.single_book
        } else {
            config.all_books
        };
        let columns = ColumnLayout::calculate(text.line_count(), density);

        let markers = map_lines_to_books(corpus.book_markers(), text.verse_start_lines());
        let regions = calculate_book_regions(&markers, &columns);

        info!(
            verses = corpus.len(),
            lines = text.line_count(),
            columns = columns.num_columns(),
            lines_per_column = columns.lines_per_column(),
            regions = regions.len(),
            "Corpus layout built"
        );

        Self {
            text,
            columns,
            regions,
        }
    }

    /// Book region containing global `line_index`.
    pub fn region_of_line(&self, line_index: usize) -> Option<&BookRegion> {
        let (column, row) = self.columns.locate(line_index)?;
        self.regions
            .iter()
            .find(|r| r.column == column && r.start_line <= row && row <= r.end_line)
    }
}
