//! Runtime and collection configuration.

use std::str::FromStr;

use crate::errors::RagError;
use crate::record::FilterMode;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine similarity (recommended for most embeddings).
    #[default]
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl FromStr for DistanceKind {
    type Err = RagError;

    /// Case-insensitive; accepts `cosine`, `dot`/`dotproduct`, `euclid`/`euclidean`/`l2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "dot" | "dotproduct" => Ok(Self::Dot),
            "euclid" | "euclidean" | "l2" => Ok(Self::Euclid),
            other => Err(RagError::Config(format!("unknown distance '{other}'"))),
        }
    }
}

impl FromStr for FilterMode {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "client" | "post" => Ok(Self::Client),
            other => Err(RagError::Config(format!("unknown filter mode '{other}'"))),
        }
    }
}

/// Describes the vector space of the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Default number of results per query.
    pub top_k: u64,
    /// Where category filters are applied by default.
    pub filter_mode: FilterMode,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            exact_search: false,
            top_k: 3,
            filter_mode: FilterMode::Server,
        }
    }

    /// Builds configuration from environment variables.
    ///
    /// - `QDRANT_URL` (default: `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default: `documents`)
    /// - `QDRANT_DISTANCE` (`cosine` | `dot` | `euclid`; default: `cosine`)
    /// - `QDRANT_BATCH_SIZE` (default: 256)
    /// - `QDRANT_EXACT_SEARCH` (default: false)
    /// - `RAG_TOP_K` (default: 3)
    /// - `RAG_FILTER_MODE` (`server` | `client`; default: `server`)
    ///
    /// # Errors
    /// Returns `RagError::Config` for unparsable or out-of-range values.
    pub fn from_env() -> Result<Self, RagError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RagConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RagError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::new_default(
            get("QDRANT_URL").unwrap_or_else(|| "http://localhost:6334".into()),
            get("QDRANT_COLLECTION").unwrap_or_else(|| "documents".into()),
        );
        cfg.qdrant_api_key = get("QDRANT_API_KEY");

        if let Some(v) = get("QDRANT_DISTANCE") {
            cfg.distance = v.parse()?;
        }
        if let Some(v) = get("QDRANT_BATCH_SIZE") {
            cfg.upsert_batch = parse_var("QDRANT_BATCH_SIZE", &v)?;
        }
        if let Some(v) = get("QDRANT_EXACT_SEARCH") {
            cfg.exact_search = parse_var("QDRANT_EXACT_SEARCH", &v)?;
        }
        if let Some(v) = get("RAG_TOP_K") {
            cfg.top_k = parse_var("RAG_TOP_K", &v)?;
        }
        if let Some(v) = get("RAG_FILTER_MODE") {
            cfg.filter_mode = v.parse()?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be > 0".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, RagError> {
    value
        .parse::<T>()
        .map_err(|_| RagError::Config(format!("failed to parse {key} = '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = RagConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.qdrant_url, "http://localhost:6334");
        assert_eq!(cfg.collection, "documents");
        assert_eq!(cfg.distance, DistanceKind::Cosine);
        assert_eq!(cfg.upsert_batch, 256);
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.filter_mode, FilterMode::Server);
        assert!(cfg.qdrant_api_key.is_none());
        assert!(!cfg.exact_search);
    }

    #[test]
    fn reads_overrides() {
        let cfg = RagConfig::from_lookup(lookup(&[
            ("QDRANT_URL", "http://qdrant:6334"),
            ("QDRANT_COLLECTION", "kb"),
            ("QDRANT_DISTANCE", "Dot"),
            ("QDRANT_BATCH_SIZE", "64"),
            ("QDRANT_EXACT_SEARCH", "true"),
            ("RAG_TOP_K", "5"),
            ("RAG_FILTER_MODE", "client"),
            ("QDRANT_API_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.qdrant_url, "http://qdrant:6334");
        assert_eq!(cfg.collection, "kb");
        assert_eq!(cfg.distance, DistanceKind::Dot);
        assert_eq!(cfg.upsert_batch, 64);
        assert!(cfg.exact_search);
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.filter_mode, FilterMode::Client);
        assert_eq!(cfg.qdrant_api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RagConfig::from_lookup(lookup(&[("RAG_TOP_K", "0")])),
            Err(RagError::Config(_))
        ));
        assert!(matches!(
            RagConfig::from_lookup(lookup(&[("QDRANT_BATCH_SIZE", "many")])),
            Err(RagError::Config(_))
        ));
        assert!(matches!(
            RagConfig::from_lookup(lookup(&[("QDRANT_DISTANCE", "manhattan")])),
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn distance_aliases() {
        assert_eq!("L2".parse::<DistanceKind>().unwrap(), DistanceKind::Euclid);
        assert_eq!("dotproduct".parse::<DistanceKind>().unwrap(), DistanceKind::Dot);
    }
}
