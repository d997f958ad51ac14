//! Ingestion pipeline: ensure collection → embed each document → upsert in batches.
//!
//! Point ids are the documents' positions in the input, so re-ingesting the
//! same list overwrites the same points instead of adding new ones. Only
//! `text` is embedded; the whole document becomes the payload.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::bootstrap::CollectionBootstrap;
use crate::config::{RagConfig, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::record::{Document, EmbeddedPoint, IngestReport};
use crate::store::VectorStore;

/// Ingests `documents` into the configured collection.
///
/// The collection is bootstrapped first (created if missing, dimension
/// checked otherwise). Any embedding or store failure aborts the run and is
/// returned; batches already written stay written.
///
/// # Errors
/// - [`RagError::DimensionMismatch`] if the collection exists with another size.
/// - [`RagError::Embedding`] / [`RagError::VectorSizeMismatch`] from the provider.
/// - Store errors from the upsert.
pub async fn ingest_documents(
    cfg: &RagConfig,
    store: &dyn VectorStore,
    provider: &dyn EmbeddingsProvider,
    bootstrap: &CollectionBootstrap,
    documents: &[Document],
) -> Result<IngestReport, RagError> {
    info!(
        "Ingesting {} documents into '{}'",
        documents.len(),
        cfg.collection
    );

    let outcome = bootstrap
        .ensure(
            store,
            &cfg.collection,
            VectorSpace {
                size: provider.dimension(),
                distance: cfg.distance,
            },
        )
        .await?;

    let mut report = IngestReport {
        documents: documents.len(),
        created_collection: outcome.created,
        ..IngestReport::default()
    };

    if documents.is_empty() {
        debug!("No documents to ingest");
        return Ok(report);
    }

    let batch_size = cfg.upsert_batch.max(1);
    let total_chunks = documents.len().div_ceil(batch_size);
    let pb = progress_bar(total_chunks as u64);

    for (chunk_idx, chunk) in documents.chunks(batch_size).enumerate() {
        let first_id = (chunk_idx * batch_size) as u64;
        let points = build_points(chunk, first_id, outcome.space.size, provider).await?;
        report.upserted += store.upsert(&cfg.collection, points).await?;
        report.batches += 1;
        pb.inc(1);
    }

    pb.finish_with_message("Ingestion complete");
    info!(
        "Ingested {} documents in {} batches",
        report.upserted, report.batches
    );
    Ok(report)
}

/// Embeds one batch; ids run from `first_id` in input order.
async fn build_points(
    chunk: &[Document],
    first_id: u64,
    vector_size: usize,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<EmbeddedPoint>, RagError> {
    let mut points = Vec::with_capacity(chunk.len());

    for (offset, doc) in chunk.iter().enumerate() {
        let vector = provider.embed(&doc.text).await?;
        if vector.len() != vector_size {
            return Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want: vector_size,
            });
        }
        points.push(EmbeddedPoint {
            id: first_id + offset as u64,
            vector,
            payload: doc.clone(),
        });
    }

    Ok(points)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map(|s| s.progress_chars("##-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::hashing::HashEmbedder;
    use crate::store::MemoryStore;

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::new(format!("doc {i}"), format!("body number {i}"), "misc"))
            .collect()
    }

    fn cfg(batch: usize) -> RagConfig {
        let mut cfg = RagConfig::new_default("http://unused:6334", "docs");
        cfg.upsert_batch = batch;
        cfg
    }

    #[tokio::test]
    async fn batches_and_positional_ids() {
        let store = MemoryStore::new();
        let embedder = HashEmbedder::new(32);
        let boot = CollectionBootstrap::new();

        let report = ingest_documents(&cfg(2), &store, &embedder, &boot, &docs(5))
            .await
            .unwrap();
        assert_eq!(
            report,
            IngestReport {
                documents: 5,
                upserted: 5,
                batches: 3,
                created_collection: true,
            }
        );
        assert_eq!(store.count("docs").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn empty_input_only_bootstraps() {
        let store = MemoryStore::new();
        let embedder = HashEmbedder::new(8);
        let boot = CollectionBootstrap::new();

        let report = ingest_documents(&cfg(4), &store, &embedder, &boot, &[])
            .await
            .unwrap();
        assert_eq!(report.upserted, 0);
        assert_eq!(report.batches, 0);
        assert!(store.collection_exists("docs").await.unwrap());
        assert_eq!(store.count("docs").await.unwrap(), 0);
    }

    /// Fails on any text containing `FAIL`, hashes everything else.
    struct FlakyEmbedder(HashEmbedder);

    impl EmbeddingsProvider for FlakyEmbedder {
        fn dimension(&self) -> usize {
            self.0.dimension()
        }

        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> futures::future::BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async move {
                if text.contains("FAIL") {
                    return Err(RagError::Embedding("model refused input".into()));
                }
                self.0.embed_sync(text)
            })
        }
    }

    fn ok_then_failing() -> Vec<Document> {
        vec![
            Document::new("ok", "fine text", "misc"),
            Document::new("bad", "FAIL here", "misc"),
        ]
    }

    #[tokio::test]
    async fn embedding_failure_aborts() {
        let store = MemoryStore::new();
        let embedder = FlakyEmbedder(HashEmbedder::new(8));
        let boot = CollectionBootstrap::new();

        let err = ingest_documents(&cfg(8), &store, &embedder, &boot, &ok_then_failing())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
        // Both documents share one batch, so nothing was written.
        assert_eq!(store.count("docs").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn earlier_batches_survive_a_later_failure() {
        let store = MemoryStore::new();
        let embedder = FlakyEmbedder(HashEmbedder::new(8));
        let boot = CollectionBootstrap::new();

        let err = ingest_documents(&cfg(1), &store, &embedder, &boot, &ok_then_failing())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
        assert_eq!(store.count("docs").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn punctuation_only_document_is_ingested() {
        let store = MemoryStore::new();
        let embedder = HashEmbedder::new(8);
        let boot = CollectionBootstrap::new();
        let docs = vec![
            Document::new("ok", "fine text", "misc"),
            Document::new("marks", "!!!", "misc"),
        ];

        let report = ingest_documents(&cfg(8), &store, &embedder, &boot, &docs)
            .await
            .unwrap();
        assert_eq!(report.upserted, 2);
        assert_eq!(store.count("docs").await.unwrap(), 2);
    }
}
