//! Corpus document loader.

use crate::model::{BookMarker, Corpus, CorpusError, VerseMeta};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// On-disk corpus shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorpusDocument {
    verses: Vec<String>,
    #[serde(default)]
    verse_meta: Option<Vec<VerseMeta>>,
    #[serde(default)]
    book_markers: Option<Vec<BookMarker>>,
}

/// Parse a corpus document.
///
/// `verseMeta` may be omitted, in which case every verse gets default
/// metadata. `bookMarkers` may be omitted, in which case markers are derived
/// from book-name changes.
pub fn parse_corpus(json: &str) -> Result<Corpus, CorpusError> {
    let doc: CorpusDocument =
        serde_json::from_str(json).map_err(|e| CorpusError::Json(e.to_string()))?;
    let meta = doc
        .verse_meta
        .unwrap_or_else(|| vec![VerseMeta::default(); doc.verses.len()]);
    Corpus::from_parts(doc.verses, meta, doc.book_markers)
}

/// Read and parse the corpus at `path`.
pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CorpusError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CorpusError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    let corpus = parse_corpus(&json)?;
    info!(
        path = %path.display(),
        verses = corpus.len(),
        books = corpus.books().len(),
        "Corpus loaded"
    );
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VerseKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOC: &str = r#"{
        "verses": ["1 Nephi 1:1 I was born", "Alma 1:1 Now it came to pass"],
        "verseMeta": [
            {"kind": "verse", "book": "1 Nephi", "chapter": 1, "verseNumber": 1},
            {"kind": "verse", "book": "Alma", "chapter": 1, "verseNumber": 1}
        ],
        "bookMarkers": [{"bookIndex": 0, "lineIndex": 0}, {"bookIndex": 1, "lineIndex": 1}]
    }"#;

    #[test]
    fn parses_camel_case_document() {
        let corpus = parse_corpus(DOC).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.books(), &["1 Nephi".to_string(), "Alma".to_string()]);
        assert_eq!(corpus.verse(1).map(|v| v.meta.kind), Some(VerseKind::Verse));
        assert_eq!(corpus.verse(1).map(|v| v.reference()), Some("Alma 1:1".to_string()));
    }

    #[test]
    fn markers_are_derived_when_absent() {
        let doc = r#"{
            "verses": ["a", "b", "c"],
            "verseMeta": [{"book": "X"}, {"book": "X"}, {"book": "Y"}]
        }"#;
        let corpus = parse_corpus(doc).unwrap();
        assert_eq!(corpus.book_markers().len(), 2);
        assert_eq!(corpus.book_of_verse(2), Some(1));
    }

    #[test]
    fn meta_is_optional() {
        let corpus = parse_corpus(r#"{"verses": ["a", "b"]}"#).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.book_markers().is_empty());
    }

    #[test]
    fn meta_length_mismatch_is_error() {
        let doc = r#"{"verses": ["a", "b"], "verseMeta": [{}]}"#;
        assert_eq!(
            parse_corpus(doc).unwrap_err(),
            CorpusError::MetaMismatch { verses: 2, meta: 1 }
        );
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(matches!(parse_corpus("{"), Err(CorpusError::Json(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_corpus(Path::new("/nonexistent/corpus.json")).unwrap_err();
        assert!(matches!(err, CorpusError::NotFound { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
    }
}
