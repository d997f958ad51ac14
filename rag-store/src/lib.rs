//! High-level RAG facade: document ingestion and semantic retrieval over a vector store.
//!
//! This crate provides a clean API to:
//! - Bootstrap a collection whose size matches the embedder, exactly once
//! - Ingest documents with positional, overwrite-on-rerun point ids
//! - Retrieve the top-K documents for a text query, optionally filtered by category
//! - Drive the above from one-line `query|category:value` input
//!
//! The embedder and the store are injected, so tests run against
//! [`MemoryStore`] and [`HashEmbedder`] without any network.

mod bootstrap;
mod config;
mod corpus;
mod embed;
mod errors;
mod ingest;
mod query_parser;
mod record;
mod render;
mod retrieve;
mod session;
mod store;

pub use bootstrap::{BootstrapOutcome, CollectionBootstrap};
pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use corpus::{read_documents_jsonl, sample_documents};
pub use embed::EmbeddingsProvider;
pub use embed::hashing::HashEmbedder;
pub use embed::ollama::OllamaEmbedder;
pub use errors::RagError;
pub use query_parser::{ParsedQuery, parse_line};
pub use record::{
    CategoryFilter, Document, EmbeddedPoint, FilterMode, IngestReport, RagQuery, SearchResult,
};
pub use render::{filtered_block, interactive_block, semantic_block};
pub use session::{InteractiveSession, SessionStats};
pub use store::{MemoryStore, QdrantStore, ScoredHit, SimilarityQuery, VectorStore};

use std::sync::Arc;

use tracing::{debug, trace};

/// High-level facade that wires configuration, vector store and embedder.
///
/// This is the single entry point recommended for application code. Both
/// pipelines go through the same provider, so queries and stored points
/// always share one embedding space.
pub struct RagStore {
    cfg: RagConfig,
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingsProvider>,
    bootstrap: CollectionBootstrap,
}

impl RagStore {
    /// Constructs a store over explicit collaborators.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the configuration is invalid or the
    /// provider reports a zero dimension.
    pub fn new(
        cfg: RagConfig,
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, RagError> {
        trace!("RagStore::new collection={}", cfg.collection);
        cfg.validate()?;
        if provider.dimension() == 0 {
            return Err(RagError::Config("embedder dimension must be > 0".into()));
        }
        Ok(Self {
            cfg,
            store,
            provider,
            bootstrap: CollectionBootstrap::new(),
        })
    }

    /// Constructs a store backed by Qdrant at `cfg.qdrant_url`.
    ///
    /// # Errors
    /// Returns `RagError::Config` for invalid config or
    /// `RagError::StoreUnavailable` if the client cannot be built.
    pub fn with_qdrant(
        cfg: RagConfig,
        provider: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, RagError> {
        let store = Arc::new(QdrantStore::new(&cfg)?);
        Self::new(cfg, store, provider)
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Vector space the collection must have for this embedder.
    pub fn vector_space(&self) -> VectorSpace {
        VectorSpace {
            size: self.provider.dimension(),
            distance: self.cfg.distance,
        }
    }

    /// Creates the collection if missing and checks its dimension otherwise.
    ///
    /// Runs once per `RagStore`; later calls return the first outcome.
    ///
    /// # Errors
    /// Returns `RagError::DimensionMismatch` when an existing collection was
    /// built for another embedder, or store errors.
    pub async fn ensure_collection(&self) -> Result<BootstrapOutcome, RagError> {
        debug!("RagStore::ensure_collection name={}", self.cfg.collection);
        self.bootstrap
            .ensure(self.store.as_ref(), &self.cfg.collection, self.vector_space())
            .await
    }

    /// Embeds and upserts `documents`; point ids are their positions.
    ///
    /// # Errors
    /// Returns bootstrap, embedding or store errors. A failure leaves earlier batches written.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestReport, RagError> {
        debug!("RagStore::ingest documents={}", documents.len());
        ingest::ingest_documents(
            &self.cfg,
            self.store.as_ref(),
            self.provider.as_ref(),
            &self.bootstrap,
            documents,
        )
        .await
    }

    /// Returns up to `query.top_k` documents ranked by similarity.
    ///
    /// # Errors
    /// Returns `RagError::EmptyQuery`/`InvalidQuery` for bad input, embedding or store errors otherwise.
    pub async fn search(&self, query: RagQuery<'_>) -> Result<Vec<SearchResult>, RagError> {
        trace!("RagStore::search top_k={}", query.top_k);
        retrieve::search(&self.cfg, self.store.as_ref(), self.provider.as_ref(), query).await
    }

    /// Performs a low-level vector search and returns raw hits.
    ///
    /// # Errors
    /// Returns store errors.
    pub async fn search_by_vector(
        &self,
        query_vector: Vec<f32>,
        top_k: u64,
        filter: Option<CategoryFilter>,
        with_payload: bool,
    ) -> Result<Vec<ScoredHit>, RagError> {
        trace!("RagStore::search_by_vector top_k={top_k} with_payload={with_payload}");
        retrieve::search_by_vector(
            &self.cfg,
            self.store.as_ref(),
            query_vector,
            top_k,
            filter,
            with_payload,
        )
        .await
    }

    /// Number of points in the collection.
    ///
    /// # Errors
    /// Returns `RagError::CollectionNotFound` before the collection exists, or store errors.
    pub async fn point_count(&self) -> Result<u64, RagError> {
        self.store.count(&self.cfg.collection).await
    }
}
