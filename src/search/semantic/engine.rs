//! Semantic search engine: memoized loading, status, and query dispatch.

use super::index::{ScoredVerse, VectorIndex};
use super::worker::{SearchRequest, SearchTransport, SemanticBackend};
use crate::model::{EmbeddingLoadError, EmbeddingSet, SemanticError};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

// ===== Collaborators =====

/// Supplies precomputed embeddings.
pub trait IndexLoader: Send + Sync {
    /// Load and validate the embedding set.
    fn load(&self) -> Result<EmbeddingSet, EmbeddingLoadError>;
}

impl<F> IndexLoader for F
where
    F: Fn() -> Result<EmbeddingSet, EmbeddingLoadError> + Send + Sync,
{
    fn load(&self) -> Result<EmbeddingSet, EmbeddingLoadError> {
        self()
    }
}

/// Text → fixed-length vector.
pub trait Embedder: Send + Sync {
    /// Embed one query string.
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;
}

/// Produces the embedding model on first use.
pub trait ModelLoader: Send + Sync {
    /// Load the model.
    fn load(&self) -> Result<Arc<dyn Embedder>, SemanticError>;
}

impl<F> ModelLoader for F
where
    F: Fn() -> Result<Arc<dyn Embedder>, SemanticError> + Send + Sync,
{
    fn load(&self) -> Result<Arc<dyn Embedder>, SemanticError> {
        self()
    }
}

// ===== Status =====

/// Availability of semantic search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticStatus {
    /// Nothing loaded yet.
    Idle,
    /// Embeddings are loading.
    Loading,
    /// Index is ready for queries.
    Ready,
    /// The embeddings resource does not exist.
    Missing,
    /// Loading failed for another reason.
    Error,
}

impl SemanticStatus {
    /// Lowercase name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Missing => "missing",
            Self::Error => "error",
        }
    }
}

// ===== Engine =====

/// Vector search over precomputed verse embeddings.
///
/// The index and the model load at most once. Concurrent callers await the
/// same initialization; its outcome, success or failure, is kept.
pub struct SemanticSearchEngine {
    index_loader: Arc<dyn IndexLoader>,
    model_loader: Option<Arc<dyn ModelLoader>>,
    use_worker: bool,
    backend: OnceCell<Result<SemanticBackend, SemanticError>>,
    model: OnceCell<Result<Arc<dyn Embedder>, SemanticError>>,
    status: Mutex<SemanticStatus>,
}

impl std::fmt::Debug for SemanticSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticSearchEngine")
            .field("status", &self.status())
            .field("use_worker", &self.use_worker)
            .field("has_model", &self.model_loader.is_some())
            .finish()
    }
}

impl SemanticSearchEngine {
    /// Engine loading embeddings from `index_loader`, offloading search to a
    /// worker thread when `use_worker` is set.
    pub fn new(index_loader: impl IndexLoader + 'static, use_worker: bool) -> Self {
        Self {
            index_loader: Arc::new(index_loader),
            model_loader: None,
            use_worker,
            backend: OnceCell::new(),
            model: OnceCell::new(),
            status: Mutex::new(SemanticStatus::Idle),
        }
    }

    /// Attach the model used by text queries.
    pub fn with_model(mut self, model_loader: impl ModelLoader + 'static) -> Self {
        self.model_loader = Some(Arc::new(model_loader));
        self
    }

    /// Current status.
    pub fn status(&self) -> SemanticStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Failure recorded by the last load, if any.
    pub fn last_error(&self) -> Option<SemanticError> {
        match self.backend.get() {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// True if text queries can be embedded.
    pub fn has_model(&self) -> bool {
        self.model_loader.is_some()
    }

    /// `"local"` or `"worker"` once ready.
    pub fn backend_kind(&self) -> Option<&'static str> {
        match self.backend.get() {
            Some(Ok(backend)) => Some(backend.kind()),
            _ => None,
        }
    }

    /// Load the index once and return the backend.
    pub async fn ensure_ready(&self) -> Result<&SemanticBackend, SemanticError> {
        let outcome = self.backend.get_or_init(|| self.initialize()).await;
        outcome.as_ref().map_err(Clone::clone)
    }

    /// Rank verses against `embedding`.
    pub async fn search(
        &self,
        embedding: Vec<f32>,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredVerse>, SemanticError> {
        let backend = self.ensure_ready().await?;
        backend
            .send(SearchRequest::Query {
                embedding,
                top_k,
                min_score,
            })
            .await
    }

    /// Rank verses against a stored verse, excluding the verse itself.
    pub async fn search_by_verse(
        &self,
        verse_index: usize,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredVerse>, SemanticError> {
        let backend = self.ensure_ready().await?;
        backend
            .send(SearchRequest::SimilarTo {
                verse_index,
                top_k,
                min_score,
            })
            .await
    }

    /// Embed `text` and rank verses against it.
    pub async fn search_text(
        &self,
        text: &str,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredVerse>, SemanticError> {
        self.ensure_ready().await?;
        let embedding = self.embed(text).await?;
        let results = self.search(embedding, top_k, min_score).await?;
        debug!(query = text, results = results.len(), "Semantic search complete");
        Ok(results)
    }

    /// Embed one query string with the memoized model.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let model = self.ensure_model().await?;
        let text = text.to_string();
        tokio::task::spawn_blocking(move || model.embed(&text))
            .await
            .unwrap_or_else(|e| Err(SemanticError::Model(e.to_string())))
    }

    async fn ensure_model(&self) -> Result<Arc<dyn Embedder>, SemanticError> {
        let loader = self
            .model_loader
            .clone()
            .ok_or_else(|| SemanticError::Unavailable("no embedding model configured".to_string()))?;
        self.model
            .get_or_init(|| async move {
                info!("Loading embedding model");
                let loaded = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .unwrap_or_else(|e| Err(SemanticError::Model(e.to_string())));
                if let Err(e) = &loaded {
                    error!(error = %e, "Embedding model failed to load");
                }
                loaded
            })
            .await
            .clone()
    }

    fn set_status(&self, status: SemanticStatus) {
        let mut current = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != status {
            debug!(from = current.as_str(), to = status.as_str(), "Semantic status changed");
            *current = status;
        }
    }

    async fn initialize(&self) -> Result<SemanticBackend, SemanticError> {
        self.set_status(SemanticStatus::Loading);
        info!("Loading embeddings");

        let loader = Arc::clone(&self.index_loader);
        let use_worker = self.use_worker;
        let outcome = tokio::task::spawn_blocking(move || {
            let index = VectorIndex::from_set(loader.load()?);
            Ok(if use_worker {
                SemanticBackend::worker_or_local(index)
            } else {
                SemanticBackend::local(index)
            })
        })
        .await
        .unwrap_or_else(|e| Err(SemanticError::Worker(e.to_string())));

        match &outcome {
            Ok(backend) => {
                info!(
                    backend = backend.kind(),
                    dimension = backend.dimension(),
                    "Semantic search ready"
                );
                self.set_status(SemanticStatus::Ready);
            }
            Err(SemanticError::Load(EmbeddingLoadError::Missing { path })) => {
                warn!(path = %path.display(), "Embeddings not found, semantic search disabled");
                self.set_status(SemanticStatus::Missing);
            }
            Err(e) => {
                error!(error = %e, "Embeddings failed to load");
                self.set_status(SemanticStatus::Error);
            }
        }
        outcome
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
