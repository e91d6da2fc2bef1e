//! Domain model: corpus types, embeddings and the error taxonomy.

pub mod embedding;
pub mod error;
pub mod verse;

pub use embedding::{EmbeddingRecord, EmbeddingSet};
pub use error::{AppError, ControllerError, CorpusError, EmbeddingLoadError, SemanticError};
pub use verse::{derive_book_markers, BookMarker, Corpus, Verse, VerseKind, VerseMeta};
