//! Retrieval helpers: low-level vector search and the text query pipeline.

use tracing::{debug, trace};

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::record::{CategoryFilter, Document, FilterMode, RagQuery, SearchResult};
use crate::store::{ScoredHit, SimilarityQuery, VectorStore};

/// Performs a low-level similarity search given a ready query vector.
///
/// # Errors
/// Returns store errors unchanged.
pub async fn search_by_vector(
    cfg: &RagConfig,
    store: &dyn VectorStore,
    query_vector: Vec<f32>,
    top_k: u64,
    filter: Option<CategoryFilter>,
    with_payload: bool,
) -> Result<Vec<ScoredHit>, RagError> {
    trace!(
        "retrieve::search_by_vector top_k={top_k} with_payload={with_payload} exact={}",
        cfg.exact_search
    );
    store
        .query(
            &cfg.collection,
            SimilarityQuery {
                vector: query_vector,
                top_k,
                filter,
                with_payload,
                with_vectors: false,
                exact: cfg.exact_search,
            },
        )
        .await
}

/// Embeds the query text and returns at most `top_k` ranked documents.
///
/// With [`FilterMode::Server`] the category predicate is part of the store
/// query, so the top-k is taken among matching documents only. With
/// [`FilterMode::Client`] the unfiltered top-k is fetched and non-matching
/// hits are dropped, which may leave fewer than `top_k` results.
///
/// # Errors
/// - [`RagError::EmptyQuery`] for blank text, [`RagError::InvalidQuery`] for `top_k == 0`.
/// - Embedding and store errors.
/// - [`RagError::Payload`] if a hit carries no decodable document.
pub async fn search(
    cfg: &RagConfig,
    store: &dyn VectorStore,
    provider: &dyn EmbeddingsProvider,
    query: RagQuery<'_>,
) -> Result<Vec<SearchResult>, RagError> {
    trace!(
        "retrieve::search top_k={} filter={:?} mode={:?}",
        query.top_k, query.filter, query.mode
    );

    if query.text.trim().is_empty() {
        return Err(RagError::EmptyQuery);
    }
    if query.top_k == 0 {
        return Err(RagError::InvalidQuery("top_k must be at least 1".into()));
    }

    let qv = provider.embed(query.text).await?;

    let (store_filter, post_filter) = match query.mode {
        FilterMode::Server => (query.filter, None),
        FilterMode::Client => (None, query.filter),
    };

    let hits = search_by_vector(cfg, store, qv, query.top_k, store_filter, true).await?;
    let mut out = hits_to_results(hits)?;

    if let Some(f) = post_filter {
        let before = out.len();
        out.retain(|r| f.matches(&r.payload));
        debug!(
            "post-filter category={} kept {}/{} hits",
            f.value,
            out.len(),
            before
        );
    }

    trace!("retrieve::search hits={}", out.len());
    Ok(out)
}

fn hits_to_results(hits: Vec<ScoredHit>) -> Result<Vec<SearchResult>, RagError> {
    hits.into_iter()
        .map(|hit| {
            let payload = hit
                .payload
                .ok_or_else(|| RagError::Payload(format!("hit {:?} has no payload", hit.id)))?;
            let doc: Document = serde_json::from_value(payload)
                .map_err(|e| RagError::Payload(format!("hit {:?}: {e}", hit.id)))?;
            Ok(SearchResult {
                id: hit.id,
                score: hit.score,
                payload: doc,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hits_decode_into_documents() {
        let hits = vec![ScoredHit {
            id: Some(2),
            score: 0.5,
            payload: Some(json!({"title": "Qdrant Overview", "text": "t", "category": "database"})),
            vector: None,
        }];
        let out = hits_to_results(hits).unwrap();
        assert_eq!(out[0].id, Some(2));
        assert_eq!(out[0].payload.title, "Qdrant Overview");
    }

    #[test]
    fn missing_or_partial_payload_is_an_error() {
        let no_payload = ScoredHit {
            id: Some(0),
            score: 0.1,
            payload: None,
            vector: None,
        };
        assert!(matches!(
            hits_to_results(vec![no_payload]),
            Err(RagError::Payload(_))
        ));

        let partial = ScoredHit {
            id: Some(1),
            score: 0.1,
            payload: Some(json!({"title": "only a title"})),
            vector: None,
        };
        assert!(matches!(
            hits_to_results(vec![partial]),
            Err(RagError::Payload(_))
        ));
    }
}
