//! Resource Registry
//!
//! **[BRN-REG-010]** Lazy, idempotent loader and holder for the heavy
//! resources: the language model, the embedding model and the vector
//! store. One instance lives in `AppState`; state transitions happen only
//! under the Deep-lane lock, and once `Ready` the resources are read
//! lock-free.
//!
//! Load order and failure policy:
//! 1. vector store open: failure logged and tolerated, store stays absent
//! 2. language model: failure is fatal to readiness (`Failed(reason)`),
//!    retried lazily on a later request
//! 3. embedding model probe: failure disables semantic search only

use crate::inference::{CompletionClient, EmbeddingClient};
use crate::store::{StoreError, VectorStore};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Readiness state machine. Transitions move forward only; there is no
/// regression from `Ready`; `Failed` re-enters `Loading` on the next
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

impl ResourceState {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceState::Unloaded => "unloaded",
            ResourceState::Loading => "loading",
            ResourceState::Ready => "ready",
            ResourceState::Failed(_) => "failed",
        }
    }
}

/// Non-blocking diagnostics snapshot for the boundary layer.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: String,
    pub model_ready: bool,
    pub embedder_ready: bool,
    pub store_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Seam between the registry's state machine and the actual resource
/// backends, so the lifecycle is testable without runtimes.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// `Ok(None)` means the store path is absent (a fresh install);
    /// `Err` is an open failure. Both leave the store unavailable.
    async fn open_store(&self) -> Result<Option<VectorStore>, String>;

    /// Load the language model. An error here is fatal to readiness.
    async fn load_language_model(&self) -> Result<(), String>;

    /// Probe the embedding model. An error only disables semantic search.
    async fn probe_embedder(&self) -> Result<(), String>;
}

/// Production loader wiring the real backends.
pub struct ProductionLoader {
    pub store_path: PathBuf,
    pub model_path: PathBuf,
    pub completion: Arc<CompletionClient>,
    pub embedding: Arc<EmbeddingClient>,
}

#[async_trait]
impl ResourceLoader for ProductionLoader {
    async fn open_store(&self) -> Result<Option<VectorStore>, String> {
        match VectorStore::open(&self.store_path) {
            Ok(store) => Ok(Some(store)),
            Err(StoreError::Missing(path)) => {
                info!(path = %path, "Store path not found, skipping");
                Ok(None)
            }
            Err(e) => Err(e.to_string()),
        }
    }

    async fn load_language_model(&self) -> Result<(), String> {
        if !self.model_path.exists() {
            return Err(format!("Model not found at {}", self.model_path.display()));
        }
        info!(model = %self.model_path.display(), "Loading model");
        self.completion
            .warm_up()
            .await
            .map_err(|e| format!("Model load failed: {}", e))
    }

    async fn probe_embedder(&self) -> Result<(), String> {
        self.embedding.probe().await.map_err(|e| e.to_string())
    }
}

struct Inner {
    state: ResourceState,
    store: Option<Arc<VectorStore>>,
    embedder_ready: bool,
    last_error: Option<String>,
}

pub struct ResourceRegistry {
    loader: Arc<dyn ResourceLoader>,
    deep_lock: Arc<Mutex<()>>,
    inner: RwLock<Inner>,
}

impl ResourceRegistry {
    /// `deep_lock` is the Deep lane's mutex; loading and deep inference
    /// serialize on the same lock on purpose.
    pub fn new(loader: Arc<dyn ResourceLoader>, deep_lock: Arc<Mutex<()>>) -> Self {
        Self {
            loader,
            deep_lock,
            inner: RwLock::new(Inner {
                state: ResourceState::Unloaded,
                store: None,
                embedder_ready: false,
                last_error: None,
            }),
        }
    }

    /// Idempotent load. Returns immediately once `Ready`; otherwise the
    /// attempt runs under the Deep lock, and concurrent callers block on
    /// that same attempt instead of starting a second one.
    pub async fn ensure_ready(&self) -> ResourceState {
        if self.state() == ResourceState::Ready {
            return ResourceState::Ready;
        }

        let _guard = self.deep_lock.lock().await;

        // A queued caller may find the work already done
        if self.state() == ResourceState::Ready {
            return ResourceState::Ready;
        }

        info!("Smart loader: starting");
        self.with_inner(|inner| inner.state = ResourceState::Loading);

        if self.store().is_none() {
            match self.loader.open_store().await {
                Ok(Some(store)) => {
                    info!(rows = store.len(), "Vector store connected");
                    self.with_inner(|inner| inner.store = Some(Arc::new(store)));
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Vector store unavailable, continuing without it"),
            }
        }

        if let Err(reason) = self.loader.load_language_model().await {
            error!(error = %reason, "Model load failed");
            self.with_inner(|inner| {
                inner.state = ResourceState::Failed(reason.clone());
                inner.last_error = Some(reason.clone());
            });
            return ResourceState::Failed(reason);
        }

        if !self.embedder_ready() {
            match self.loader.probe_embedder().await {
                Ok(()) => {
                    info!("Embedding model ready");
                    self.with_inner(|inner| inner.embedder_ready = true);
                }
                Err(e) => warn!(error = %e, "Embeddings disabled, semantic search unavailable"),
            }
        }

        self.with_inner(|inner| {
            inner.state = ResourceState::Ready;
            inner.last_error = None;
        });
        info!("Model loaded successfully");
        ResourceState::Ready
    }

    pub fn state(&self) -> ResourceState {
        self.inner.read().expect("registry lock poisoned").state.clone()
    }

    /// The vector store, when connected. Lock-free after `Ready`.
    pub fn store(&self) -> Option<Arc<VectorStore>> {
        self.inner.read().expect("registry lock poisoned").store.clone()
    }

    pub fn embedder_ready(&self) -> bool {
        self.inner.read().expect("registry lock poisoned").embedder_ready
    }

    /// Read-only diagnostics; never blocks on a load in progress.
    pub fn status(&self) -> StatusSnapshot {
        let inner = self.inner.read().expect("registry lock poisoned");
        StatusSnapshot {
            state: inner.state.label().to_string(),
            model_ready: inner.state == ResourceState::Ready,
            embedder_ready: inner.embedder_ready,
            store_ready: inner.store.is_some(),
            store_rows: inner.store.as_ref().map(|s| s.len()),
            last_error: inner.last_error.clone(),
        }
    }

    fn with_inner(&self, f: impl FnOnce(&mut Inner)) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        f(&mut inner);
    }
}
