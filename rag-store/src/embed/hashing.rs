//! Deterministic offline embedder based on feature hashing.
//!
//! Each lower-cased word token is hashed with blake3 into one of `dim`
//! buckets with a ±1 sign, and the result is L2-normalised. Texts sharing
//! vocabulary end up close under cosine; identical texts get identical
//! vectors. Text without any word token is hashed whole. No model download,
//! no network.

use futures::future::BoxFuture;

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;

/// Hash-based embedder for offline runs and tests.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    /// Default dimension, matching all-MiniLM-L6-v2.
    pub const DEFAULT_DIM: usize = 384;

    /// A zero `dim` is kept as is and rejected by `RagStore::new`; see [`HashEmbedder::try_new`].
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// # Errors
    /// Returns `RagError::Config` if `dim` is zero.
    pub fn try_new(dim: usize) -> Result<Self, RagError> {
        if dim == 0 {
            return Err(RagError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        Ok(Self::new(dim))
    }

    /// Synchronous core of [`EmbeddingsProvider::embed`].
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, RagError> {
        if self.dim == 0 {
            return Err(RagError::Config("hash embedder dimension is 0".into()));
        }

        let mut v = vec![0.0f32; self.dim];
        let mut tokens = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            self.add_token(&mut v, &token.to_lowercase());
            tokens += 1;
        }

        // Punctuation-only (or empty) text still needs a stable vector.
        if tokens == 0 {
            self.add_token(&mut v, text.trim());
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn add_token(&self, v: &mut [f32], token: &str) {
        let hash = blake3::hash(token.as_bytes());
        let bytes = hash.as_bytes();

        let mut idx = [0u8; 8];
        idx.copy_from_slice(&bytes[..8]);
        let bucket = (u64::from_le_bytes(idx) % self.dim as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

        v[bucket] += sign;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

impl EmbeddingsProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move { self.embed_sync(text) })
    }
}
