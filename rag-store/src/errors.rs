//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The embedder and an existing collection disagree on vector size.
    #[error(
        "collection '{collection}' stores {collection_dim}-dim vectors but the embedder produces {embedder_dim}-dim vectors"
    )]
    DimensionMismatch {
        collection: String,
        collection_dim: usize,
        embedder_dim: usize,
    },

    /// The vector store could not be reached or rejected the request.
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),

    /// The embedder failed to produce a vector.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The query text is empty once the filter part is stripped.
    #[error("query text is empty")]
    EmptyQuery,

    /// Query parameters out of range (e.g. `top_k == 0`).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// `create_collection` was called for a name that already exists.
    #[error("collection '{0}' already exists")]
    CollectionExists(String),

    /// The named collection does not exist.
    #[error("collection '{0}' not found")]
    CollectionNotFound(String),

    /// A vector does not match the collection dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// A stored payload could not be decoded into a document.
    #[error("payload error: {0}")]
    Payload(String),

    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(String),
}

impl RagError {
    /// Errors caused by what the user typed; the interactive loop reprompts on these.
    pub fn is_user_input(&self) -> bool {
        matches!(self, RagError::EmptyQuery | RagError::InvalidQuery(_))
    }
}

impl From<serde_json::Error> for RagError {
    fn from(e: serde_json::Error) -> Self {
        RagError::Parse(e.to_string())
    }
}

impl From<embedding_service::EmbeddingServiceError> for RagError {
    fn from(e: embedding_service::EmbeddingServiceError) -> Self {
        RagError::Embedding(e.to_string())
    }
}
