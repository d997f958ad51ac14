//! In-memory store for tests and offline runs.
//!
//! Brute-force scoring over every point of a collection. Mirrors the Qdrant
//! semantics the pipelines rely on: create fails on an existing name, upsert
//! overwrites by id, cosine/dot rank descending, euclid ranks by ascending distance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{DistanceKind, VectorSpace};
use crate::errors::RagError;
use crate::record::EmbeddedPoint;
use crate::store::{ScoredHit, SimilarityQuery, VectorStore};

struct MemCollection {
    space: VectorSpace,
    points: BTreeMap<u64, EmbeddedPoint>,
}

/// In-memory vector store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, MemCollection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn score(distance: DistanceKind, a: &[f32], b: &[f32]) -> f32 {
        match distance {
            DistanceKind::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot / (norm_a * norm_b)
            }
            DistanceKind::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            DistanceKind::Euclid => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }

    /// Sort key that places NaN scores behind every real score.
    fn rank_key(distance: DistanceKind, score: f32) -> f32 {
        match (score.is_nan(), distance) {
            (false, _) => score,
            (true, DistanceKind::Euclid) => f32::INFINITY,
            (true, DistanceKind::Cosine | DistanceKind::Dot) => f32::NEG_INFINITY,
        }
    }
}

impl VectorStore for MemoryStore {
    fn collection_space<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<VectorSpace>, RagError>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            Ok(collections.get(name).map(|c| c.space))
        })
    }

    fn create_collection<'a>(
        &'a self,
        name: &'a str,
        space: VectorSpace,
    ) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(async move {
            let mut collections = self.collections.write().await;
            if collections.contains_key(name) {
                return Err(RagError::CollectionExists(name.to_string()));
            }
            collections.insert(
                name.to_string(),
                MemCollection {
                    space,
                    points: BTreeMap::new(),
                },
            );
            debug!("MemoryStore created collection '{name}' size={}", space.size);
            Ok(())
        })
    }

    fn upsert<'a>(
        &'a self,
        name: &'a str,
        points: Vec<EmbeddedPoint>,
    ) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            let mut collections = self.collections.write().await;
            let coll = collections
                .get_mut(name)
                .ok_or_else(|| RagError::CollectionNotFound(name.to_string()))?;

            // Validate the whole batch first so a bad point writes nothing.
            if let Some(bad) = points.iter().find(|p| p.vector.len() != coll.space.size) {
                return Err(RagError::VectorSizeMismatch {
                    got: bad.vector.len(),
                    want: coll.space.size,
                });
            }

            let n = points.len();
            for p in points {
                coll.points.insert(p.id, p);
            }
            debug!("MemoryStore upserted {n} points into '{name}'");
            Ok(n)
        })
    }

    fn query<'a>(
        &'a self,
        name: &'a str,
        request: SimilarityQuery,
    ) -> BoxFuture<'a, Result<Vec<ScoredHit>, RagError>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            let coll = collections
                .get(name)
                .ok_or_else(|| RagError::CollectionNotFound(name.to_string()))?;

            if request.vector.len() != coll.space.size {
                return Err(RagError::VectorSizeMismatch {
                    got: request.vector.len(),
                    want: coll.space.size,
                });
            }

            let distance = coll.space.distance;
            let mut scored: Vec<(f32, &EmbeddedPoint)> = coll
                .points
                .values()
                .filter(|p| {
                    request
                        .filter
                        .as_ref()
                        .is_none_or(|f| f.matches(&p.payload))
                })
                .map(|p| (Self::score(distance, &request.vector, &p.vector), p))
                .collect();

            // Stable sort: equal scores keep ascending id order, NaN ranks last.
            match distance {
                DistanceKind::Euclid => scored.sort_by(|a, b| {
                    Self::rank_key(distance, a.0).total_cmp(&Self::rank_key(distance, b.0))
                }),
                DistanceKind::Cosine | DistanceKind::Dot => scored.sort_by(|a, b| {
                    Self::rank_key(distance, b.0).total_cmp(&Self::rank_key(distance, a.0))
                }),
            }

            let mut hits = Vec::with_capacity(scored.len().min(request.top_k as usize));
            for (score, p) in scored.into_iter().take(request.top_k as usize) {
                let payload = if request.with_payload {
                    Some(serde_json::to_value(&p.payload)?)
                } else {
                    None
                };
                hits.push(ScoredHit {
                    id: Some(p.id),
                    score,
                    payload,
                    vector: request.with_vectors.then(|| p.vector.clone()),
                });
            }
            Ok(hits)
        })
    }

    fn count<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<u64, RagError>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            collections
                .get(name)
                .map(|c| c.points.len() as u64)
                .ok_or_else(|| RagError::CollectionNotFound(name.to_string()))
        })
    }
}
