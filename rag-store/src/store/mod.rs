//! Vector store abstraction and its implementations.
//!
//! - [`QdrantStore`]: the production backend (gRPC `qdrant-client`).
//! - [`MemoryStore`]: brute-force in-process store for tests and offline runs.

use futures::future::BoxFuture;

use crate::config::VectorSpace;
use crate::errors::RagError;
use crate::record::{CategoryFilter, EmbeddedPoint};

mod memory;
mod qdrant;

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

/// Nearest-neighbour request against one collection.
#[derive(Clone, Debug)]
pub struct SimilarityQuery {
    pub vector: Vec<f32>,
    pub top_k: u64,
    /// Mandatory ("must") equality predicate, if any.
    pub filter: Option<CategoryFilter>,
    pub with_payload: bool,
    pub with_vectors: bool,
    /// Exact scan instead of the approximate index.
    pub exact: bool,
}

/// One hit as returned by the store, best first.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredHit {
    pub id: Option<u64>,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
    pub vector: Option<Vec<f32>>,
}

/// Collection-oriented vector store.
///
/// All methods are single round-trips; none retries.
pub trait VectorStore: Send + Sync {
    /// Vector parameters of `name`, or `None` if the collection does not exist.
    fn collection_space<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<VectorSpace>, RagError>>;

    fn collection_exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(async move { Ok(self.collection_space(name).await?.is_some()) })
    }

    /// Creates `name`; fails with [`RagError::CollectionExists`] if it already exists.
    fn create_collection<'a>(
        &'a self,
        name: &'a str,
        space: VectorSpace,
    ) -> BoxFuture<'a, Result<(), RagError>>;

    /// Inserts or overwrites points by id. Returns the number of points written.
    fn upsert<'a>(
        &'a self,
        name: &'a str,
        points: Vec<EmbeddedPoint>,
    ) -> BoxFuture<'a, Result<usize, RagError>>;

    /// Top-k nearest points, ordered best first.
    fn query<'a>(
        &'a self,
        name: &'a str,
        request: SimilarityQuery,
    ) -> BoxFuture<'a, Result<Vec<ScoredHit>, RagError>>;

    /// Number of points stored in `name`.
    fn count<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<u64, RagError>>;
}
