//! Error types for verse-canvas.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions up to [`AppError`] at the binary boundary.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error
//!   - [`CorpusError`] - Text source loading failures
//!   - [`EmbeddingLoadError`] - Embedding persistence failures (missing, transport, format)
//!   - [`SemanticError`] - Semantic engine failures (not ready, bad query, worker faults)
//!   - [`ControllerError`] - Rejected controller operations
//!   - `std::io::Error` - Terminal failures
//!
//! # Recovery Strategy
//!
//! Embedding failures are **non-fatal**: the canvas stays usable with exact
//! search only, and the semantic engine's status records why semantic search
//! is unavailable. Malformed individual embedding items are skipped rather
//! than failing the load. Corpus and terminal errors are fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to load the text corpus.
    #[error("Failed to load corpus: {0}")]
    Corpus(#[from] CorpusError),

    /// Failed to load embeddings.
    #[error("Failed to load embeddings: {0}")]
    Embeddings(#[from] EmbeddingLoadError),

    /// Semantic engine failure surfaced to the caller.
    #[error("Semantic search failed: {0}")]
    Semantic(#[from] SemanticError),

    /// A controller operation was rejected.
    #[error("Canvas error: {0}")]
    Controller(#[from] ControllerError),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when loading the verse corpus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorpusError {
    /// The corpus file does not exist.
    #[error("Corpus file not found: {path}")]
    NotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The corpus file exists but could not be read.
    #[error("Failed to read corpus at {path}: {reason}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error message.
        reason: String,
    },

    /// The corpus document is not valid JSON of the expected shape.
    #[error("Invalid corpus JSON: {0}")]
    Json(String),

    /// `verses` and `verseMeta` differ in length.
    #[error("Corpus has {verses} verses but {meta} metadata rows")]
    MetaMismatch {
        /// Number of verse strings.
        verses: usize,
        /// Number of metadata rows.
        meta: usize,
    },

    /// A book marker points past the end of the corpus.
    #[error("Book marker at verse {verse_index} is out of range ({verse_count} verses)")]
    MarkerOutOfRange {
        /// Offending verse index.
        verse_index: usize,
        /// Number of verses in the corpus.
        verse_count: usize,
    },
}

/// Errors from the embedding persistence collaborator.
///
/// The three variants map to the distinct conditions the UI reports:
/// the resource is absent, the transport failed, or the content is unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbeddingLoadError {
    /// The embeddings resource does not exist.
    #[error("Embeddings not found at {path}")]
    Missing {
        /// Location that was attempted.
        path: PathBuf,
    },

    /// The resource exists but could not be fetched.
    #[error("Failed to fetch embeddings from {path}: {reason}")]
    FetchFailed {
        /// Location that failed.
        path: PathBuf,
        /// Transport error message.
        reason: String,
    },

    /// The content is not JSON, lacks required fields, or has inconsistent shape.
    #[error("Invalid embeddings format: {reason}")]
    InvalidFormat {
        /// What was wrong with the document.
        reason: String,
    },
}

impl EmbeddingLoadError {
    /// Convenience constructor for [`EmbeddingLoadError::InvalidFormat`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }
}

/// Errors raised by the semantic search engine and its execution backends.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    /// The engine has no usable index (status is not `Ready`).
    #[error("Semantic search unavailable: {0}")]
    Unavailable(String),

    /// Query vector length differs from the index embedding size.
    #[error("Query has {got} dimensions, index expects {expected}")]
    DimensionMismatch {
        /// Embedding size of the index.
        expected: usize,
        /// Length of the supplied vector.
        got: usize,
    },

    /// No stored embedding exists for the requested verse.
    #[error("No embedding stored for verse {0}")]
    UnknownVerse(usize),

    /// The embedding model failed to load or to embed a query.
    #[error("Embedding model error: {0}")]
    Model(String),

    /// The worker caught a fault while serving a request.
    #[error("Search worker error: {0}")]
    Worker(String),

    /// The worker stopped before replying.
    #[error("Search worker is no longer running")]
    WorkerGone,

    /// Loading embeddings failed.
    #[error(transparent)]
    Load(#[from] EmbeddingLoadError),
}

/// Errors returned by controller operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    /// Semantic search was requested outside the all-books view.
    #[error("Semantic search is only available in the all-books view")]
    SemanticNotInView,

    /// No semantic engine was configured.
    #[error("No semantic engine configured")]
    NoSemanticEngine,

    /// The match index does not exist in the active result set.
    #[error("No match at index {0}")]
    UnknownMatch(usize),

    /// The verse index is past the end of the corpus.
    #[error("No verse at index {0}")]
    UnknownVerse(usize),

    /// The book index has no verses.
    #[error("No book at index {0}")]
    UnknownBook(usize),

    /// The semantic engine failed.
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_missing_display_includes_path() {
        let err = EmbeddingLoadError::Missing {
            path: PathBuf::from("/data/embeddings.json"),
        };
        assert!(err.to_string().contains("/data/embeddings.json"));
    }

    #[test]
    fn embedding_error_converts_into_semantic_error() {
        let err: SemanticError = EmbeddingLoadError::invalid("no items").into();
        assert_eq!(err.to_string(), "Invalid embeddings format: no items");
    }

    #[test]
    fn corpus_error_converts_into_app_error() {
        let err: AppError = CorpusError::Json("eof".to_string()).into();
        assert!(matches!(err, AppError::Corpus(_)));
    }

    #[test]
    fn semantic_error_passes_through_controller_error() {
        let err: ControllerError = SemanticError::WorkerGone.into();
        assert_eq!(err.to_string(), "Search worker is no longer running");
    }

    #[test]
    fn dimension_mismatch_reports_both_sizes() {
        let err = SemanticError::DimensionMismatch {
            expected: 384,
            got: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("384") && msg.contains('3'));
    }
}
