//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind [`VectorStore`],
//! hiding away the verbose builder pattern and keeping the rest of the
//! crate decoupled from `qdrant-client`.

use std::collections::HashMap;

use futures::future::BoxFuture;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
    ScoredPoint, SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder, point_id::PointIdOptions, vectors_config, vectors_output,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;
use crate::record::{CategoryFilter, EmbeddedPoint};
use crate::store::{ScoredHit, SimilarityQuery, VectorStore};

/// Qdrant-backed [`VectorStore`].
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Creates a client from the given configuration.
    ///
    /// No request is sent here; connectivity problems surface on first use.
    ///
    /// # Errors
    /// Returns `RagError::Config` for invalid config and
    /// `RagError::StoreUnavailable` if the client cannot be built.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(store_err)?;

        info!("Qdrant client configured for {}", cfg.qdrant_url);
        Ok(Self { client })
    }

    /// Qdrant reports a missing collection as a generic status; tell it apart by re-checking.
    async fn missing_or(&self, name: &str, err: QdrantError) -> RagError {
        let exists = self.client.collection_exists(name).await.map_err(store_err);
        classify_failure(name, exists, store_err(err))
    }
}

impl VectorStore for QdrantStore {
    fn collection_space<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<VectorSpace>, RagError>> {
        Box::pin(async move {
            if !self.collection_exists(name).await? {
                return Ok(None);
            }

            let info = self.client.collection_info(name).await.map_err(store_err)?;
            let params = info
                .result
                .and_then(|r| r.config)
                .and_then(|c| c.params)
                .and_then(|p| p.vectors_config)
                .and_then(|v| v.config);

            match params {
                Some(vectors_config::Config::Params(vp)) => Ok(Some(VectorSpace {
                    size: vp.size as usize,
                    distance: distance_from_qdrant(vp.distance)?,
                })),
                Some(vectors_config::Config::ParamsMap(_)) => Err(RagError::Config(format!(
                    "collection '{name}' uses named vectors, expected a single unnamed vector"
                ))),
                None => Err(RagError::StoreUnavailable(format!(
                    "collection '{name}' info has no vector params"
                ))),
            }
        })
    }

    fn collection_exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(async move { self.client.collection_exists(name).await.map_err(store_err) })
    }

    fn create_collection<'a>(
        &'a self,
        name: &'a str,
        space: VectorSpace,
    ) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(async move {
            info!(
                "Creating collection '{}' with size={} distance={:?}",
                name, space.size, space.distance
            );

            let res = self
                .client
                .create_collection(
                    CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                        space.size as u64,
                        distance_to_qdrant(space.distance),
                    )),
                )
                .await;

            if let Err(err) = res {
                // Qdrant reports a name clash as a generic status; tell it apart by re-checking.
                if self.client.collection_exists(name).await.unwrap_or(false) {
                    warn!("Collection '{}' already exists (error={})", name, err);
                    return Err(RagError::CollectionExists(name.to_string()));
                }
                return Err(store_err(err));
            }

            info!("Collection '{}' created successfully", name);
            Ok(())
        })
    }

    fn upsert<'a>(
        &'a self,
        name: &'a str,
        points: Vec<EmbeddedPoint>,
    ) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            if points.is_empty() {
                debug!("No points provided for upsert");
                return Ok(0);
            }

            let mut structs = Vec::with_capacity(points.len());
            for p in points {
                let payload: Payload = serde_json::to_value(&p.payload)?
                    .try_into()
                    .map_err(|e: QdrantError| RagError::Payload(e.to_string()))?;
                structs.push(PointStruct::new(p.id, p.vector, payload));
            }
            let n = structs.len();

            info!("Upserting {} points into collection '{}'", n, name);
            let res = self
                .client
                .upsert_points(UpsertPointsBuilder::new(name, structs).wait(true))
                .await
                .map_err(store_err)?;
            debug!("Upsert operation result={:?}", res.result);

            Ok(n)
        })
    }

    fn query<'a>(
        &'a self,
        name: &'a str,
        request: SimilarityQuery,
    ) -> BoxFuture<'a, Result<Vec<ScoredHit>, RagError>> {
        Box::pin(async move {
            info!(
                "Searching in '{}' with top_k={}, filter={}, exact={}",
                name,
                request.top_k,
                request.filter.is_some(),
                request.exact
            );

            let mut builder = SearchPointsBuilder::new(name, request.vector, request.top_k)
                .with_payload(request.with_payload)
                .with_vectors(request.with_vectors);

            if let Some(f) = &request.filter {
                builder = builder.filter(to_qdrant_filter(f));
            }
            if request.exact {
                builder = builder.params(SearchParamsBuilder::default().exact(true));
            }

            let res = match self.client.search_points(builder).await {
                Ok(res) => res,
                Err(err) => return Err(self.missing_or(name, err).await),
            };

            let out: Vec<ScoredHit> = res.result.into_iter().map(scored_to_hit).collect();
            debug!("Search completed: {} hits returned", out.len());
            Ok(out)
        })
    }

    fn count<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<u64, RagError>> {
        Box::pin(async move {
            let res = match self
                .client
                .count(CountPointsBuilder::new(name).exact(true))
                .await
            {
                Ok(res) => res,
                Err(err) => return Err(self.missing_or(name, err).await),
            };
            Ok(res.result.map(|r| r.count).unwrap_or(0))
        })
    }
}

/// Builds a `must` filter with one keyword match on the category field.
pub(crate) fn to_qdrant_filter(f: &CategoryFilter) -> Filter {
    Filter::must([Condition::matches(
        CategoryFilter::FIELD,
        f.value.clone(),
    )])
}

/// `CollectionNotFound` when the collection is known to be absent, `err` otherwise.
fn classify_failure(name: &str, exists: Result<bool, RagError>, err: RagError) -> RagError {
    match exists {
        Ok(false) => RagError::CollectionNotFound(name.to_string()),
        Ok(true) | Err(_) => err,
    }
}

fn store_err(e: QdrantError) -> RagError {
    RagError::StoreUnavailable(e.to_string())
}

fn distance_to_qdrant(d: DistanceKind) -> Distance {
    match d {
        DistanceKind::Cosine => Distance::Cosine,
        DistanceKind::Dot => Distance::Dot,
        DistanceKind::Euclid => Distance::Euclid,
    }
}

fn distance_from_qdrant(raw: i32) -> Result<DistanceKind, RagError> {
    match Distance::try_from(raw) {
        Ok(Distance::Cosine) => Ok(DistanceKind::Cosine),
        Ok(Distance::Dot) => Ok(DistanceKind::Dot),
        Ok(Distance::Euclid) => Ok(DistanceKind::Euclid),
        _ => Err(RagError::Config(format!("unsupported collection distance {raw}"))),
    }
}

/// Maps a `ScoredPoint` into a [`ScoredHit`]; UUID ids map to `None`.
fn scored_to_hit(sp: ScoredPoint) -> ScoredHit {
    let id = sp
        .id
        .and_then(|pid| pid.point_id_options)
        .and_then(|opt| match opt {
            PointIdOptions::Num(n) => Some(n),
            PointIdOptions::Uuid(_) => None,
        });

    let payload = (!sp.payload.is_empty()).then(|| qpayload_to_json(sp.payload));

    #[allow(deprecated)]
    let vector = sp
        .vectors
        .and_then(|v| v.vectors_options)
        .and_then(|opt| match opt {
            vectors_output::VectorsOptions::Vector(v) => Some(v.data),
            _ => None,
        });

    ScoredHit {
        id,
        score: sp.score,
        payload,
        vector,
    }
}

/// Converts a Qdrant payload map into a JSON object.
fn qpayload_to_json(p: HashMap<String, QValue>) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> =
        p.into_iter().map(|(k, v)| (k, v.into_json())).collect();
    serde_json::Value::Object(map)
}
