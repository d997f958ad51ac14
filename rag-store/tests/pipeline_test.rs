//! Integration tests for the ingestion and query pipelines.
//!
//! Runs the full flow (bootstrap → embed → upsert → search) against the
//! in-memory store and the hashing embedder, so no Qdrant or Ollama is needed.

use std::sync::Arc;

use rag_store::{
    Document, FilterMode, HashEmbedder, MemoryStore, RagConfig, RagError, RagQuery, RagStore,
    sample_documents,
};

const TEST_DIM: usize = 384;

fn config() -> RagConfig {
    RagConfig::new_default("http://localhost:6334", "documents")
}

fn rag_over(store: &MemoryStore, dim: usize) -> RagStore {
    RagStore::new(
        config(),
        Arc::new(store.clone()),
        Arc::new(HashEmbedder::new(dim)),
    )
    .unwrap()
}

async fn ingested_sample() -> (MemoryStore, RagStore) {
    let store = MemoryStore::new();
    let rag = rag_over(&store, TEST_DIM);
    rag.ingest(&sample_documents()).await.unwrap();
    (store, rag)
}

#[tokio::test]
async fn exact_text_ranks_its_document_first() {
    let (_, rag) = ingested_sample().await;

    for doc in sample_documents() {
        let results = rag.search(RagQuery::new(&doc.text, 3)).await.unwrap();
        let top = results.first().expect("at least one hit");
        let tied_top: Vec<&Document> = results
            .iter()
            .filter(|r| (r.score - top.score).abs() < 1e-6)
            .map(|r| &r.payload)
            .collect();
        assert!(tied_top.contains(&&doc), "{} not in top for its own text", doc.title);
        assert!((top.score - 1.0).abs() < 1e-4);
    }
}

#[tokio::test]
async fn results_are_bounded_and_descending() {
    let (_, rag) = ingested_sample().await;

    let two = rag
        .search(RagQuery::new("How do vector databases work?", 2))
        .await
        .unwrap();
    assert_eq!(two.len(), 2);

    let all = rag
        .search(RagQuery::new("How do vector databases work?", 10))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn server_filter_ranks_only_matching_documents() {
    let (_, rag) = ingested_sample().await;

    let results = rag
        .search(RagQuery::new("How do vector databases work?", 3).category("database"))
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.payload.category == "database"));

    let none = rag
        .search(RagQuery::new("anything at all", 3).category("cooking"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn client_filter_is_a_subset_of_the_unfiltered_window() {
    let (_, rag) = ingested_sample().await;
    let text = "RAG combines retrieval and generation using language models.";

    let unfiltered = rag.search(RagQuery::new(text, 1)).await.unwrap();
    assert_eq!(unfiltered[0].payload.title, "Python RAG");

    // The only candidate in a top-1 window is the "ai" document.
    let client = rag
        .search(
            RagQuery::new(text, 1)
                .category("database")
                .mode(FilterMode::Client),
        )
        .await
        .unwrap();
    assert!(client.is_empty());

    // Server-side filtering still finds a database document.
    let server = rag
        .search(RagQuery::new(text, 1).category("database"))
        .await
        .unwrap();
    assert_eq!(server.len(), 1);
    assert_eq!(server[0].payload.category, "database");

    let wide = rag
        .search(
            RagQuery::new(text, 3)
                .category("database")
                .mode(FilterMode::Client),
        )
        .await
        .unwrap();
    let window = rag.search(RagQuery::new(text, 3)).await.unwrap();
    for r in &wide {
        assert_eq!(r.payload.category, "database");
        assert!(window.iter().any(|w| w.id == r.id));
    }
}

#[tokio::test]
async fn reingest_keeps_point_count() {
    let (_, rag) = ingested_sample().await;
    let docs = sample_documents();

    let report = rag.ingest(&docs).await.unwrap();
    assert_eq!(report.upserted, docs.len());
    assert_eq!(rag.point_count().await.unwrap(), docs.len() as u64);
}

#[tokio::test]
async fn empty_collection_returns_no_results() {
    let store = MemoryStore::new();
    let rag = rag_over(&store, TEST_DIM);
    rag.ingest(&[]).await.unwrap();

    let results = rag.search(RagQuery::new("vector", 3)).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_before_ingest_reports_missing_collection() {
    let rag = rag_over(&MemoryStore::new(), TEST_DIM);
    assert!(matches!(
        rag.search(RagQuery::new("vector", 3)).await,
        Err(RagError::CollectionNotFound(_))
    ));
}

#[tokio::test]
async fn bad_queries_are_user_errors() {
    let (_, rag) = ingested_sample().await;

    let blank = rag.search(RagQuery::new("   ", 3)).await.unwrap_err();
    assert!(matches!(blank, RagError::EmptyQuery));
    let zero = rag.search(RagQuery::new("vector", 0)).await.unwrap_err();
    assert!(matches!(zero, RagError::InvalidQuery(_)));
    assert!(blank.is_user_input() && zero.is_user_input());
}

#[tokio::test]
async fn punctuation_only_document_is_searchable() {
    let store = MemoryStore::new();
    let rag = rag_over(&store, TEST_DIM);
    let marks = Document::new("Marks", "???", "misc");
    let mut docs = sample_documents();
    docs.push(marks.clone());

    let report = rag.ingest(&docs).await.unwrap();
    assert_eq!(report.upserted, docs.len());

    let results = rag.search(RagQuery::new("???", 3)).await.unwrap();
    assert_eq!(results[0].payload, marks);
    assert!((results[0].score - 1.0).abs() < 1e-4);
}

#[test]
fn zero_dimension_embedder_is_rejected() {
    let err = RagStore::new(
        config(),
        Arc::new(MemoryStore::new()),
        Arc::new(HashEmbedder::new(0)),
    )
    .err()
    .expect("zero dimension must be rejected");
    assert!(matches!(err, RagError::Config(_)));
    assert!(matches!(HashEmbedder::try_new(0), Err(RagError::Config(_))));
}

#[tokio::test]
async fn embedder_with_other_dimension_fails_fast() {
    let (store, _) = ingested_sample().await;

    let other = rag_over(&store, 64);
    let err = other.ensure_collection().await.unwrap_err();
    assert!(matches!(
        err,
        RagError::DimensionMismatch {
            collection_dim: TEST_DIM,
            embedder_dim: 64,
            ..
        }
    ));
    assert!(matches!(
        other.ingest(&sample_documents()).await,
        Err(RagError::DimensionMismatch { .. })
    ));
}

#[tokio::test]
async fn collection_is_created_once() {
    let store = MemoryStore::new();
    let rag = rag_over(&store, TEST_DIM);

    let first = rag.ensure_collection().await.unwrap();
    assert!(first.created);
    assert_eq!(first.space, rag.vector_space());

    // A second facade over the same store finds the collection already there.
    let again = rag_over(&store, TEST_DIM).ensure_collection().await.unwrap();
    assert!(!again.created);
}

#[tokio::test]
async fn search_by_vector_returns_raw_hits() {
    let (_, rag) = ingested_sample().await;
    let qv = HashEmbedder::new(TEST_DIM)
        .embed_sync("Qdrant is a vector database optimized for embeddings.")
        .unwrap();

    let hits = rag.search_by_vector(qv, 1, None, false).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, Some(2));
    assert!(hits[0].payload.is_none());
}
