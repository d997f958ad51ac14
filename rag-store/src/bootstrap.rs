//! Collection lifecycle: create at most once, verify dimensions on every start.
//!
//! [`CollectionBootstrap`] runs [`ensure_collection`] once per instance behind
//! an async once-cell, so concurrent callers inside the process share one
//! check-then-create sequence. A clash with another process is caught through
//! the store's `CollectionExists` error and re-verified.

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::VectorSpace;
use crate::errors::RagError;
use crate::store::VectorStore;

/// Result of bringing a collection up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Vector space of the collection as stored.
    pub space: VectorSpace,
    /// Whether this bootstrap created the collection.
    pub created: bool,
}

/// Once-only guard around [`ensure_collection`].
#[derive(Debug, Default)]
pub struct CollectionBootstrap {
    cell: OnceCell<BootstrapOutcome>,
}

impl CollectionBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures the collection exists and matches `wanted`; later calls return the cached outcome.
    ///
    /// A failed attempt is not cached, so the next call retries.
    pub async fn ensure(
        &self,
        store: &dyn VectorStore,
        name: &str,
        wanted: VectorSpace,
    ) -> Result<BootstrapOutcome, RagError> {
        self.cell
            .get_or_try_init(|| ensure_collection(store, name, wanted))
            .await
            .copied()
    }
}

/// Creates `name` with `wanted` if absent; otherwise checks that its vector size matches.
///
/// # Errors
/// - [`RagError::DimensionMismatch`] if an existing collection has a different size.
/// - Store errors from the underlying calls.
pub async fn ensure_collection(
    store: &dyn VectorStore,
    name: &str,
    wanted: VectorSpace,
) -> Result<BootstrapOutcome, RagError> {
    info!(
        collection = name,
        size = wanted.size,
        distance = ?wanted.distance,
        "ensuring collection"
    );

    if let Some(existing) = store.collection_space(name).await? {
        debug!("Collection '{}' already exists", name);
        verify(name, existing, wanted)?;
        return Ok(BootstrapOutcome {
            space: existing,
            created: false,
        });
    }

    match store.create_collection(name, wanted).await {
        Ok(()) => {
            info!(collection = name, "collection created");
            Ok(BootstrapOutcome {
                space: wanted,
                created: true,
            })
        }
        Err(RagError::CollectionExists(_)) => {
            warn!(
                collection = name,
                "collection appeared between check and create, re-verifying"
            );
            let existing = store
                .collection_space(name)
                .await?
                .ok_or_else(|| RagError::CollectionNotFound(name.to_string()))?;
            verify(name, existing, wanted)?;
            Ok(BootstrapOutcome {
                space: existing,
                created: false,
            })
        }
        Err(e) => Err(e),
    }
}

fn verify(name: &str, existing: VectorSpace, wanted: VectorSpace) -> Result<(), RagError> {
    if existing.size != wanted.size {
        return Err(RagError::DimensionMismatch {
            collection: name.to_string(),
            collection_dim: existing.size,
            embedder_dim: wanted.size,
        });
    }
    if existing.distance != wanted.distance {
        warn!(
            collection = name,
            existing = ?existing.distance,
            configured = ?wanted.distance,
            "collection distance differs from config; the collection's metric is used"
        );
    }
    Ok(())
}
