//! Embedding document loader.
//!
//! Document shape: `{embeddingSize?: int, items: [{verseIndex, embedding}]}`.
//! Items with missing fields or the wrong vector length are skipped; the
//! document as a whole fails only when nothing usable remains.

use crate::model::{EmbeddingLoadError, EmbeddingRecord, EmbeddingSet};
use crate::search::semantic::IndexLoader;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// MIME type of embedding documents.
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingDocument {
    #[serde(default)]
    embedding_size: Option<usize>,
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    verse_index: usize,
    embedding: Vec<f32>,
}

/// Content type implied by a file extension, if known.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(JSON_CONTENT_TYPE),
        "txt" => Some("text/plain"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}

fn is_json_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == JSON_CONTENT_TYPE || essence.ends_with("+json")
}

/// Validate and decode an embedding document.
///
/// A declared `content_type` other than JSON is rejected before parsing.
/// With `embeddingSize` declared, items of other lengths are skipped;
/// without it, the first item sets the size and any disagreement is an
/// error.
pub fn parse_embeddings(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<EmbeddingSet, EmbeddingLoadError> {
    if let Some(content_type) = content_type {
        if !is_json_type(content_type) {
            return Err(EmbeddingLoadError::invalid(format!(
                "expected JSON content, got {content_type}"
            )));
        }
    }

    let doc: EmbeddingDocument = serde_json::from_slice(bytes)
        .map_err(|e| EmbeddingLoadError::invalid(format!("not a JSON object: {e}")))?;
    let items = doc
        .items
        .ok_or_else(|| EmbeddingLoadError::invalid("missing items array"))?;
    if items.is_empty() {
        return Err(EmbeddingLoadError::invalid("items array is empty"));
    }

    let total = items.len();
    let parsed: Vec<RawItem> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let missing_fields = total - parsed.len();

    let embedding_size = match doc.embedding_size {
        Some(size) => size,
        None => {
            let size = parsed.first().map_or(0, |item| item.embedding.len());
            if parsed.iter().any(|item| item.embedding.len() != size) {
                return Err(EmbeddingLoadError::invalid("inconsistent embedding lengths"));
            }
            size
        }
    };
    if embedding_size == 0 {
        return Err(EmbeddingLoadError::invalid("embedding size is zero"));
    }

    let records = parsed
        .into_iter()
        .map(|item| EmbeddingRecord {
            verse_index: item.verse_index,
            embedding: item.embedding,
        })
        .collect();
    let (set, wrong_length) = EmbeddingSet::from_records(embedding_size, records);

    let skipped = missing_fields + wrong_length;
    if skipped > 0 {
        warn!(skipped, total, "Skipped malformed embedding items");
    }
    if set.is_empty() {
        return Err(EmbeddingLoadError::invalid("no valid items"));
    }
    Ok(set)
}

/// Read and decode the embeddings at `path`.
pub fn load_embeddings(path: &Path) -> Result<EmbeddingSet, EmbeddingLoadError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EmbeddingLoadError::Missing {
            path: path.to_path_buf(),
        },
        _ => EmbeddingLoadError::FetchFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    let set = parse_embeddings(&bytes, content_type_for(path))?;
    info!(
        path = %path.display(),
        items = set.len(),
        embedding_size = set.embedding_size(),
        "Embeddings loaded"
    );
    Ok(set)
}

/// [`IndexLoader`] reading an embeddings file.
#[derive(Debug, Clone)]
pub struct EmbeddingFile {
    path: PathBuf,
}

impl EmbeddingFile {
    /// Loader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IndexLoader for EmbeddingFile {
    fn load(&self) -> Result<EmbeddingSet, EmbeddingLoadError> {
        load_embeddings(&self.path)
    }
}
