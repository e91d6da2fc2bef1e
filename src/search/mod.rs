//! Search engines and the match list they share.
//!
//! Both engines produce [`SearchMatch`] records keyed by global line index.
//! [`MatchSet`] owns a result list, its per-line index for highlight lookup,
//! and the navigation cursor.

pub mod exact;
pub mod semantic;

pub use exact::{ExactSearchEngine, MIN_TERM_CHARS};

use std::collections::HashMap;

// ===== SearchMatch =====

/// A highlighted span on one wrapped line.
///
/// Exact matches cover the matched characters. Semantic matches cover a
/// whole line of a matched verse and carry the verse-level score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    /// Global line index.
    pub line_index: usize,
    /// First matched character (inclusive).
    pub start_char: usize,
    /// One past the last matched character.
    pub end_char: usize,
    /// Text of the line.
    pub line_text: String,
    /// Owning verse for semantic matches.
    pub verse_index: Option<usize>,
    /// Similarity score for semantic matches.
    pub score: Option<f32>,
}

impl SearchMatch {
    /// Number of highlighted characters.
    pub fn char_len(&self) -> usize {
        self.end_char.saturating_sub(self.start_char)
    }

    /// Character midpoint of the span, used for centering.
    pub fn mid_char(&self) -> f64 {
        (self.start_char + self.end_char) as f64 / 2.0
    }
}

// ===== MatchSet =====

/// Ordered match list with a by-line index and a navigation cursor.
///
/// Match indices are positions in the list and stay stable until the set
/// is replaced.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    matches: Vec<SearchMatch>,
    by_line: HashMap<usize, Vec<usize>>,
    current: Option<usize>,
}

impl MatchSet {
    /// Build a set; the cursor starts unset.
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        let mut by_line: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, m) in matches.iter().enumerate() {
            by_line.entry(m.line_index).or_default().push(i);
        }
        Self {
            matches,
            by_line,
            current: None,
        }
    }

    /// All matches in order.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Match by index.
    pub fn get(&self, index: usize) -> Option<&SearchMatch> {
        self.matches.get(index)
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True if there are no matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Indices of matches on `line_index`, left to right.
    pub fn on_line(&self, line_index: usize) -> &[usize] {
        self.by_line
            .get(&line_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cursor position.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Match under the cursor.
    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current.and_then(|i| self.matches.get(i))
    }

    /// Advance the cursor with wraparound. From an unset cursor the first
    /// step lands on match 0. Returns `None` when the set is empty.
    pub fn advance(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(i) => (i + 1) % self.matches.len(),
            None => 0,
        };
        self.current = Some(next);
        self.current
    }

    /// Move the cursor to `index`. Returns false for an unknown index.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.matches.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Drop every match and reset the cursor.
    pub fn clear(&mut self) {
        self.matches.clear();
        self.by_line.clear();
        self.current = None;
    }
}
