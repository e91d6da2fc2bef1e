//! Request/response transports for vector search.
//!
//! [`LocalTransport`] runs requests in the caller's context.
//! [`WorkerTransport`] moves the index onto a dedicated thread and talks to
//! it only through channels: each request gets an id from a monotonic
//! counter, a pending table maps ids to reply slots, and a router thread
//! resolves slots as replies arrive. Both transports run the same
//! [`SearchRequest::execute`], so results are identical.

use super::index::{ScoredVerse, VectorIndex};
use crate::model::SemanticError;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Outcome of one search request.
pub type SearchResponse = Result<Vec<ScoredVerse>, SemanticError>;

// ===== Requests =====

/// A vector search request.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    /// Rank against an arbitrary query vector.
    Query {
        /// Query vector, same length as the index embeddings.
        embedding: Vec<f32>,
        /// Result bound; `None` or `0` means exhaustive.
        top_k: Option<usize>,
        /// Lowest score kept.
        min_score: Option<f32>,
    },
    /// Rank against a stored verse, excluding that verse.
    SimilarTo {
        /// Verse whose embedding is the query.
        verse_index: usize,
        /// Result bound; `None` or `0` means exhaustive.
        top_k: Option<usize>,
        /// Lowest score kept.
        min_score: Option<f32>,
    },
}

impl SearchRequest {
    /// Run against `index`.
    pub fn execute(&self, index: &VectorIndex) -> SearchResponse {
        match self {
            Self::Query {
                embedding,
                top_k,
                min_score,
            } => index.search(embedding, *top_k, *min_score),
            Self::SimilarTo {
                verse_index,
                top_k,
                min_score,
            } => index.search_by_verse(*verse_index, *top_k, *min_score),
        }
    }
}

// ===== Transport seam =====

/// Sends a request to wherever the index lives and awaits the reply.
pub trait SearchTransport: Send + Sync {
    /// Submit `request`.
    fn send(&self, request: SearchRequest) -> impl Future<Output = SearchResponse> + Send;
}

/// In-process transport.
#[derive(Debug)]
pub struct LocalTransport {
    index: VectorIndex,
}

impl LocalTransport {
    /// Own `index` locally.
    pub fn new(index: VectorIndex) -> Self {
        Self { index }
    }

    /// Run a request synchronously.
    pub fn execute(&self, request: &SearchRequest) -> SearchResponse {
        request.execute(&self.index)
    }

    /// Embedding size of the index.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }
}

impl SearchTransport for LocalTransport {
    async fn send(&self, request: SearchRequest) -> SearchResponse {
        self.execute(&request)
    }
}

// ===== Worker =====

type Handler = Box<dyn Fn(&VectorIndex, &SearchRequest) -> SearchResponse + Send>;
type PendingTable = Arc<Mutex<HashMap<u64, oneshot::Sender<SearchResponse>>>>;

enum WorkerMessage {
    Init(VectorIndex),
    Search { id: u64, request: SearchRequest },
    Shutdown,
}

struct WorkerReply {
    id: u64,
    response: SearchResponse,
}

/// The worker thread could not be started. The index is handed back.
#[derive(Debug)]
pub struct SpawnFailure {
    /// Index that was not transferred.
    pub index: VectorIndex,
    /// Why the spawn failed.
    pub error: SemanticError,
}

/// Transport backed by a dedicated search thread.
pub struct WorkerTransport {
    requests: mpsc::Sender<WorkerMessage>,
    pending: PendingTable,
    next_id: AtomicU64,
    dimension: usize,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for WorkerTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerTransport")
            .field("dimension", &self.dimension)
            .field("pending", &lock(&self.pending).len())
            .finish()
    }
}

impl WorkerTransport {
    /// Start the worker and transfer `index` to it.
    pub fn spawn(index: VectorIndex) -> Result<Self, SpawnFailure> {
        Self::spawn_with(index, Box::new(|index: &VectorIndex, request: &SearchRequest| {
            request.execute(index)
        }))
    }

    /// Start the worker with a custom request handler.
    pub(crate) fn spawn_with(index: VectorIndex, handler: Handler) -> Result<Self, SpawnFailure> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerMessage>();
        let (reply_tx, reply_rx) = mpsc::channel::<WorkerReply>();
        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));

        let worker = thread::Builder::new()
            .name("semantic-worker".to_string())
            .spawn(move || run_worker(request_rx, reply_tx, handler));
        let worker = match worker {
            Ok(handle) => handle,
            Err(e) => {
                return Err(SpawnFailure {
                    index,
                    error: SemanticError::Worker(e.to_string()),
                })
            }
        };

        let router_pending = Arc::clone(&pending);
        let router = thread::Builder::new()
            .name("semantic-router".to_string())
            .spawn(move || run_router(reply_rx, router_pending));
        let router = match router {
            Ok(handle) => handle,
            Err(e) => {
                // The worker never received the index; stop it and hand the index back.
                let _ = request_tx.send(WorkerMessage::Shutdown);
                let _ = worker.join();
                return Err(SpawnFailure {
                    index,
                    error: SemanticError::Worker(e.to_string()),
                });
            }
        };

        let dimension = index.dimension();
        let rows = index.len();
        if let Err(mpsc::SendError(WorkerMessage::Init(index))) =
            request_tx.send(WorkerMessage::Init(index))
        {
            let _ = worker.join();
            let _ = router.join();
            return Err(SpawnFailure {
                index,
                error: SemanticError::WorkerGone,
            });
        }
        info!(rows, dimension, "Embedding index transferred to search worker");

        Ok(Self {
            requests: request_tx,
            pending,
            next_id: AtomicU64::new(0),
            dimension,
            threads: Mutex::new(vec![worker, router]),
        })
    }

    /// Embedding size of the transferred index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Requests awaiting a reply.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Stop the worker and wait for both threads. Outstanding requests
    /// resolve to [`SemanticError::WorkerGone`].
    pub fn shutdown(&self) {
        let _ = self.requests.send(WorkerMessage::Shutdown);
        let threads: Vec<JoinHandle<()>> = lock(&self.threads).drain(..).collect();
        for handle in threads {
            if handle.join().is_err() {
                error!("Search thread panicked during shutdown");
            }
        }
    }
}

impl SearchTransport for WorkerTransport {
    async fn send(&self, request: SearchRequest) -> SearchResponse {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.pending).insert(id, reply_tx);

        if self
            .requests
            .send(WorkerMessage::Search { id, request })
            .is_err()
        {
            lock(&self.pending).remove(&id);
            return Err(SemanticError::WorkerGone);
        }

        reply_rx.await.unwrap_or(Err(SemanticError::WorkerGone))
    }
}

impl Drop for WorkerTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "search request panicked".to_string()
    }
}

fn run_worker(
    requests: mpsc::Receiver<WorkerMessage>,
    replies: mpsc::Sender<WorkerReply>,
    handler: Handler,
) {
    let mut index: Option<VectorIndex> = None;

    for message in requests {
        match message {
            WorkerMessage::Init(received) => {
                debug!(rows = received.len(), "Search worker initialized");
                index = Some(received);
            }
            WorkerMessage::Search { id, request } => {
                let response = match index.as_ref() {
                    None => Err(SemanticError::Unavailable(
                        "search worker has no index".to_string(),
                    )),
                    Some(index) => panic::catch_unwind(AssertUnwindSafe(|| handler(index, &request)))
                        .unwrap_or_else(|payload| {
                            let message = panic_message(payload.as_ref());
                            warn!(id, reason = %message, "Search request faulted");
                            Err(SemanticError::Worker(message))
                        }),
                };
                if replies.send(WorkerReply { id, response }).is_err() {
                    break;
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }
    debug!("Search worker stopped");
}

fn run_router(replies: mpsc::Receiver<WorkerReply>, pending: PendingTable) {
    for WorkerReply { id, response } in replies {
        match lock(&pending).remove(&id) {
            // The caller may have stopped waiting.
            Some(slot) => {
                let _ = slot.send(response);
            }
            None => debug!(id, "Reply for unknown request"),
        }
    }

    let orphans: Vec<_> = lock(&pending).drain().collect();
    if !orphans.is_empty() {
        warn!(count = orphans.len(), "Search worker exited with requests in flight");
    }
    for (_, slot) in orphans {
        let _ = slot.send(Err(SemanticError::WorkerGone));
    }
}

// ===== Backend selection =====

/// Where the semantic index lives.
#[derive(Debug)]
pub enum SemanticBackend {
    /// Same execution context.
    Local(LocalTransport),
    /// Dedicated worker thread.
    Worker(WorkerTransport),
}

impl SemanticBackend {
    /// Keep the index in-process.
    pub fn local(index: VectorIndex) -> Self {
        Self::Local(LocalTransport::new(index))
    }

    /// Offload to a worker, falling back to in-process when the worker
    /// cannot start.
    pub fn worker_or_local(index: VectorIndex) -> Self {
        match WorkerTransport::spawn(index) {
            Ok(worker) => Self::Worker(worker),
            Err(SpawnFailure { index, error }) => {
                warn!(error = %error, "Search worker unavailable, searching in-process");
                Self::local(index)
            }
        }
    }

    /// `"local"` or `"worker"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Worker(_) => "worker",
        }
    }

    /// Embedding size of the index.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Local(local) => local.dimension(),
            Self::Worker(worker) => worker.dimension(),
        }
    }
}

impl SearchTransport for SemanticBackend {
    async fn send(&self, request: SearchRequest) -> SearchResponse {
        match self {
            Self::Local(local) => local.send(request).await,
            Self::Worker(worker) => worker.send(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmbeddingRecord;

    fn index() -> VectorIndex {
        VectorIndex::from_records(
            2,
            (0..20)
                .map(|i| {
                    let angle = i as f32 * 0.15;
                    EmbeddingRecord {
                        verse_index: i,
                        embedding: vec![angle.cos(), angle.sin()],
                    }
                })
                .collect(),
        )
        .unwrap()
    }

    fn query(top_k: Option<usize>) -> SearchRequest {
        SearchRequest::Query {
            embedding: vec![1.0, 0.0],
            top_k,
            min_score: None,
        }
    }

    #[tokio::test]
    async fn worker_matches_local_results() {
        let local = SemanticBackend::local(index());
        let worker = WorkerTransport::spawn(index()).unwrap();
        for request in [
            query(Some(5)),
            query(None),
            SearchRequest::SimilarTo {
                verse_index: 7,
                top_k: Some(3),
                min_score: Some(0.5),
            },
        ] {
            assert_eq!(
                worker.send(request.clone()).await,
                local.send(request).await
            );
        }
    }

    #[tokio::test]
    async fn worker_errors_reach_only_their_request() {
        let worker = WorkerTransport::spawn(index()).unwrap();
        let bad = SearchRequest::SimilarTo {
            verse_index: 999,
            top_k: None,
            min_score: None,
        };
        let (bad, good) = tokio::join!(worker.send(bad), worker.send(query(Some(2))));
        assert_eq!(bad, Err(SemanticError::UnknownVerse(999)));
        assert_eq!(good.map(|r| r.len()), Ok(2));
        assert_eq!(worker.pending_count(), 0);
    }

    #[tokio::test]
    async fn worker_panics_are_forwarded_and_worker_survives() {
        let worker = WorkerTransport::spawn_with(
            index(),
            Box::new(|index: &VectorIndex, request: &SearchRequest| match request {
                SearchRequest::SimilarTo { verse_index: 3, .. } => panic!("corrupt row"),
                other => other.execute(index),
            }),
        )
        .unwrap();

        let faulted = worker
            .send(SearchRequest::SimilarTo {
                verse_index: 3,
                top_k: None,
                min_score: None,
            })
            .await;
        assert_eq!(faulted, Err(SemanticError::Worker("corrupt row".to_string())));

        let after = worker.send(query(Some(1))).await;
        assert_eq!(after.map(|r| r[0].verse_index), Ok(0));
    }

    #[tokio::test]
    async fn requests_after_shutdown_fail_with_worker_gone() {
        let worker = WorkerTransport::spawn(index()).unwrap();
        worker.shutdown();
        assert_eq!(worker.send(query(None)).await, Err(SemanticError::WorkerGone));
    }

    #[test]
    fn backend_kind_reports_location() {
        assert_eq!(SemanticBackend::local(index()).kind(), "local");
        assert_eq!(SemanticBackend::worker_or_local(index()).kind(), "worker");
    }
}
