//! Literal, case-insensitive search over wrapped lines.

use super::{MatchSet, SearchMatch};
use regex::RegexBuilder;
use tracing::{debug, warn};

/// Terms shorter than this (in characters) clear the search.
pub const MIN_TERM_CHARS: usize = 3;

/// Exact search state: the last term and its matches.
///
/// Matches are ordered by line index, then left to right. Matching is
/// non-overlapping, so `"aaaa"` holds one match for `"aaa"`.
#[derive(Debug, Default)]
pub struct ExactSearchEngine {
    term: Option<String>,
    results: MatchSet,
}

impl ExactSearchEngine {
    /// Create an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `lines` for `term`, replacing previous results.
    ///
    /// Returns the match count. Short terms clear the state and return 0.
    pub fn search<S: AsRef<str>>(&mut self, lines: &[S], term: &str) -> usize {
        self.clear();
        if term.chars().count() < MIN_TERM_CHARS {
            return 0;
        }

        let pattern = match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(error = %e, "Search pattern rejected");
                return 0;
            }
        };

        let mut matches = Vec::new();
        for (line_index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let mut chars_seen = 0usize;
            let mut bytes_seen = 0usize;
            for found in pattern.find_iter(line) {
                chars_seen += line[bytes_seen..found.start()].chars().count();
                let start_char = chars_seen;
                let end_char = start_char + found.as_str().chars().count();
                chars_seen = end_char;
                bytes_seen = found.end();

                matches.push(SearchMatch {
                    line_index,
                    start_char,
                    end_char,
                    line_text: line.to_string(),
                    verse_index: None,
                    score: None,
                });
            }
        }

        let count = matches.len();
        debug!(term, count, "Exact search complete");
        self.term = Some(term.to_string());
        self.results = MatchSet::new(matches);
        count
    }

    /// Advance to the next match, wrapping to the first.
    pub fn move_to_next_match(&mut self) -> Option<&SearchMatch> {
        self.results.advance()?;
        self.results.current_match()
    }

    /// The active term, if a search ran.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Current results.
    pub fn results(&self) -> &MatchSet {
        &self.results
    }

    /// Mutable access to the results cursor.
    pub fn results_mut(&mut self) -> &mut MatchSet {
        &mut self.results
    }

    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.results.len()
    }

    /// Cursor position.
    pub fn current_match_index(&self) -> Option<usize> {
        self.results.current()
    }

    /// Match indices on `line_index`.
    pub fn matches_on_line(&self, line_index: usize) -> &[usize] {
        self.results.on_line(line_index)
    }

    /// Forget the term and all matches.
    pub fn clear(&mut self) {
        self.term = None;
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_case_insensitive_matches_in_order() {
        let lines = [
            "The cat and the dog",
            "nothing here",
            "THEN there",
            "other",
        ];
        let mut engine = ExactSearchEngine::new();
        assert_eq!(engine.search(&lines, "the"), 5);
        let spans: Vec<(usize, usize)> = engine
            .results()
            .matches()
            .iter()
            .map(|m| (m.line_index, m.start_char))
            .collect();
        assert_eq!(spans, vec![(0, 0), (0, 12), (2, 0), (2, 5), (3, 2)]);
    }

    #[test]
    fn short_term_clears_previous_results() {
        let lines = ["was was"];
        let mut engine = ExactSearchEngine::new();
        assert_eq!(engine.search(&lines, "was"), 2);
        assert_eq!(engine.search(&lines, "wa"), 0);
        assert_eq!(engine.match_count(), 0);
        assert_eq!(engine.term(), None);
    }

    #[test]
    fn metacharacters_are_literal() {
        let lines = ["a.b axb (a.b)"];
        let mut engine = ExactSearchEngine::new();
        assert_eq!(engine.search(&lines, "a.b"), 2);
        assert_eq!(engine.search(&lines, "(a."), 1);
    }

    #[test]
    fn matches_do_not_overlap() {
        let mut engine = ExactSearchEngine::new();
        assert_eq!(engine.search(&["aaaa"], "aaa"), 1);
    }

    #[test]
    fn offsets_are_characters_not_bytes() {
        let mut engine = ExactSearchEngine::new();
        engine.search(&["ñandú and ñandú"], "and");
        let m = &engine.results().matches()[0];
        assert_eq!((m.start_char, m.end_char), (1, 4));
        let m = &engine.results().matches()[1];
        assert_eq!((m.start_char, m.end_char), (6, 9));
    }

    #[test]
    fn next_match_wraps_around() {
        let mut engine = ExactSearchEngine::new();
        engine.search(&["abc", "abc"], "abc");
        assert_eq!(engine.move_to_next_match().map(|m| m.line_index), Some(0));
        assert_eq!(engine.move_to_next_match().map(|m| m.line_index), Some(1));
        assert_eq!(engine.move_to_next_match().map(|m| m.line_index), Some(0));
    }

    #[test]
    fn next_match_without_results_is_none() {
        let mut engine = ExactSearchEngine::new();
        assert!(engine.move_to_next_match().is_none());
    }

    #[test]
    fn scenario_was_matches_first_two_lines() {
        let lines = [
            "1 Nephi 1:1 I was born",
            "1 Nephi 1:2 I was good",
            "1 Nephi 2:1 My father",
        ];
        let mut engine = ExactSearchEngine::new();
        assert_eq!(engine.search(&lines, "was"), 2);
        assert_eq!(engine.matches_on_line(0), &[0]);
        assert_eq!(engine.matches_on_line(1), &[1]);
        assert!(engine.matches_on_line(2).is_empty());
    }
}
