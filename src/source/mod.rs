//! Input sources for the canvas.
//!
//! This module loads the two read-only inputs:
//! - the verse corpus (`verses`, `verseMeta`, `bookMarkers`)
//! - precomputed verse embeddings for semantic search

pub mod corpus;
pub mod embeddings;

pub use corpus::{load_corpus, parse_corpus};
pub use embeddings::{
    content_type_for, load_embeddings, parse_embeddings, EmbeddingFile, JSON_CONTENT_TYPE,
};
