//! Embedding-based search.
//!
//! # Module Structure
//!
//! - `heap`: bounded min-heap used for top-k selection
//! - `index`: [`VectorIndex`], the packed embedding buffer and its scans
//! - `worker`: [`SearchTransport`] with in-process and worker-thread backends
//! - `engine`: [`SemanticSearchEngine`], memoized loading and status

pub mod engine;
pub mod heap;
pub mod index;
pub mod worker;

pub use engine::{Embedder, IndexLoader, ModelLoader, SemanticSearchEngine, SemanticStatus};
pub use heap::{ScoreHeap, Scored};
pub use index::{dot, normalize, ScoredVerse, VectorIndex};
pub use worker::{
    LocalTransport, SearchRequest, SearchResponse, SearchTransport, SemanticBackend, SpawnFailure,
    WorkerTransport,
};
