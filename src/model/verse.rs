//! Corpus data model: verses, their metadata, and book markers.

use crate::model::error::CorpusError;
use serde::{Deserialize, Serialize};

/// Role a verse row plays in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerseKind {
    /// A numbered verse of scripture text.
    #[default]
    Verse,
    /// A chapter heading row.
    Chapter,
    /// An empty spacer row.
    Blank,
}

/// Book/chapter/verse metadata attached to every verse row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseMeta {
    /// Row kind.
    #[serde(default)]
    pub kind: VerseKind,
    /// Book title (e.g. "1 Nephi").
    #[serde(default)]
    pub book: String,
    /// Chapter number, 0 when not applicable.
    #[serde(default)]
    pub chapter: u32,
    /// Verse number within the chapter, 0 when not applicable.
    #[serde(default)]
    pub verse_number: u32,
}

/// Smallest addressable unit of source text. Immutable once loaded.
///
/// # Invariants
/// - `index` equals the verse's position in its [`Corpus`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    /// Position in the corpus.
    pub index: usize,
    /// Full verse text.
    pub text: String,
    /// Book/chapter/verse metadata.
    pub meta: VerseMeta,
}

impl Verse {
    /// Human-readable reference such as `"1 Nephi 3:7"`.
    ///
    /// Chapter rows render as `"1 Nephi 3"`, blank rows and rows without a
    /// book render as an empty string.
    pub fn reference(&self) -> String {
        if self.meta.book.is_empty() {
            return String::new();
        }
        match self.meta.kind {
            VerseKind::Verse => format!(
                "{} {}:{}",
                self.meta.book, self.meta.chapter, self.meta.verse_number
            ),
            VerseKind::Chapter => format!("{} {}", self.meta.book, self.meta.chapter),
            VerseKind::Blank => String::new(),
        }
    }
}

/// Marks the first verse of a book.
///
/// The loader format names the verse row `lineIndex`; it is converted to a
/// wrapped-line index by [`crate::layout::map_lines_to_books`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMarker {
    /// Index into [`Corpus::books`].
    #[serde(rename = "bookIndex")]
    pub book_index: usize,
    /// Verse row where the book begins.
    #[serde(rename = "lineIndex")]
    pub verse_index: usize,
}

/// The loaded, read-only text corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    verses: Vec<Verse>,
    books: Vec<String>,
    book_markers: Vec<BookMarker>,
}

impl Corpus {
    /// Build a corpus from parallel text and metadata sequences.
    ///
    /// When `markers` is `None`, book markers are derived from changes of
    /// `meta.book` between consecutive rows.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::MetaMismatch`] if the sequences differ in
    /// length, and [`CorpusError::MarkerOutOfRange`] if a marker points past
    /// the last verse.
    pub fn from_parts(
        texts: Vec<String>,
        meta: Vec<VerseMeta>,
        markers: Option<Vec<BookMarker>>,
    ) -> Result<Self, CorpusError> {
        if texts.len() != meta.len() {
            return Err(CorpusError::MetaMismatch {
                verses: texts.len(),
                meta: meta.len(),
            });
        }

        let verses: Vec<Verse> = texts
            .into_iter()
            .zip(meta)
            .enumerate()
            .map(|(index, (text, meta))| Verse { index, text, meta })
            .collect();

        let mut book_markers = markers.unwrap_or_else(|| derive_book_markers(&verses));
        book_markers.sort_by_key(|m| m.verse_index);

        if let Some(bad) = book_markers.iter().find(|m| m.verse_index >= verses.len()) {
            return Err(CorpusError::MarkerOutOfRange {
                verse_index: bad.verse_index,
                verse_count: verses.len(),
            });
        }

        let book_count = book_markers
            .iter()
            .map(|m| m.book_index + 1)
            .max()
            .unwrap_or(0);
        let mut books = vec![String::new(); book_count];
        for marker in &book_markers {
            books[marker.book_index] = verses[marker.verse_index].meta.book.clone();
        }

        Ok(Self {
            verses,
            books,
            book_markers,
        })
    }

    /// Build a corpus of plain texts with default metadata and no books.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let verses = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Verse {
                index,
                text: text.into(),
                meta: VerseMeta::default(),
            })
            .collect();
        Self {
            verses,
            books: Vec::new(),
            book_markers: Vec::new(),
        }
    }

    /// All verses in order.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Verse at `index`, if any.
    pub fn verse(&self, index: usize) -> Option<&Verse> {
        self.verses.get(index)
    }

    /// Book titles indexed by book index.
    pub fn books(&self) -> &[String] {
        &self.books
    }

    /// Book start markers sorted by verse index.
    pub fn book_markers(&self) -> &[BookMarker] {
        &self.book_markers
    }

    /// Number of verses.
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// True if the corpus has no verses.
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Book index owning `verse_index`, from the last marker at or before it.
    pub fn book_of_verse(&self, verse_index: usize) -> Option<usize> {
        let pos = self
            .book_markers
            .partition_point(|m| m.verse_index <= verse_index);
        pos.checked_sub(1).map(|i| self.book_markers[i].book_index)
    }

    /// Corpus restricted to a single book, re-indexed from zero.
    ///
    /// Book indices are preserved so colors stay stable between views.
    /// Returns `None` if the book has no verses.
    pub fn filter_book(&self, book_index: usize) -> Option<Self> {
        let verses: Vec<Verse> = self
            .verses
            .iter()
            .filter(|v| self.book_of_verse(v.index) == Some(book_index))
            .enumerate()
            .map(|(index, v)| Verse {
                index,
                text: v.text.clone(),
                meta: v.meta.clone(),
            })
            .collect();

        if verses.is_empty() {
            return None;
        }

        Some(Self {
            verses,
            books: self.books.clone(),
            book_markers: vec![BookMarker {
                book_index,
                verse_index: 0,
            }],
        })
    }
}

/// Derive book markers from changes in `meta.book`.
///
/// Rows with an empty book title inherit the previous book.
pub fn derive_book_markers(verses: &[Verse]) -> Vec<BookMarker> {
    let mut markers: Vec<BookMarker> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    let mut current: Option<&str> = None;

    for verse in verses {
        let book = verse.meta.book.as_str();
        if book.is_empty() || current == Some(book) {
            continue;
        }
        let book_index = match seen.iter().position(|b| *b == book) {
            Some(i) => i,
            None => {
                seen.push(book);
                seen.len() - 1
            }
        };
        markers.push(BookMarker {
            book_index,
            verse_index: verse.index,
        });
        current = Some(book);
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(book: &str, chapter: u32, verse: u32) -> VerseMeta {
        VerseMeta {
            kind: VerseKind::Verse,
            book: book.to_string(),
            chapter,
            verse_number: verse,
        }
    }

    fn sample() -> Corpus {
        Corpus::from_parts(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![
                meta("1 Nephi", 1, 1),
                meta("1 Nephi", 1, 2),
                meta("2 Nephi", 1, 1),
                meta("2 Nephi", 1, 2),
            ],
            None,
        )
        .expect("valid corpus")
    }

    #[test]
    fn from_parts_derives_markers_from_book_changes() {
        let corpus = sample();
        assert_eq!(
            corpus.book_markers(),
            &[
                BookMarker {
                    book_index: 0,
                    verse_index: 0
                },
                BookMarker {
                    book_index: 1,
                    verse_index: 2
                },
            ]
        );
        assert_eq!(corpus.books(), &["1 Nephi".to_string(), "2 Nephi".to_string()]);
    }

    #[test]
    fn from_parts_rejects_length_mismatch() {
        let err = Corpus::from_parts(vec!["a".into()], vec![], None).unwrap_err();
        assert_eq!(err, CorpusError::MetaMismatch { verses: 1, meta: 0 });
    }

    #[test]
    fn from_parts_rejects_marker_past_end() {
        let err = Corpus::from_parts(
            vec!["a".into()],
            vec![meta("Alma", 1, 1)],
            Some(vec![BookMarker {
                book_index: 0,
                verse_index: 3,
            }]),
        )
        .unwrap_err();
        assert!(matches!(err, CorpusError::MarkerOutOfRange { verse_index: 3, .. }));
    }

    #[test]
    fn book_of_verse_uses_last_marker_at_or_before() {
        let corpus = sample();
        assert_eq!(corpus.book_of_verse(0), Some(0));
        assert_eq!(corpus.book_of_verse(1), Some(0));
        assert_eq!(corpus.book_of_verse(2), Some(1));
        assert_eq!(corpus.book_of_verse(3), Some(1));
    }

    #[test]
    fn filter_book_reindexes_and_keeps_book_index() {
        let corpus = sample();
        let single = corpus.filter_book(1).expect("book has verses");
        assert_eq!(single.len(), 2);
        assert_eq!(single.verses()[0].index, 0);
        assert_eq!(single.verses()[0].text, "c");
        assert_eq!(single.book_markers()[0].book_index, 1);
        assert!(corpus.filter_book(7).is_none());
    }

    #[test]
    fn reference_formats_by_kind() {
        let mut verse = Verse {
            index: 0,
            text: String::new(),
            meta: meta("Alma", 32, 21),
        };
        assert_eq!(verse.reference(), "Alma 32:21");
        verse.meta.kind = VerseKind::Chapter;
        assert_eq!(verse.reference(), "Alma 32");
        verse.meta.kind = VerseKind::Blank;
        assert_eq!(verse.reference(), "");
    }
}
