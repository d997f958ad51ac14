//! Ollama embedding provider.
//!
//! Wraps [`OllamaService`] and enforces a fixed output dimension.

use std::sync::Arc;

use embedding_service::OllamaService;
use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;

/// Text used to discover the model's output size when none is configured.
const DIMENSION_SAMPLE: &str = "dimension sample";

/// Ollama embedding provider (async).
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<OllamaService>,
    dim: usize,
}

impl OllamaEmbedder {
    /// Wraps a service whose model is known to produce `dim`-sized vectors.
    pub fn new(svc: Arc<OllamaService>, dim: usize) -> Self {
        Self { svc, dim }
    }

    /// Wraps a service, embedding a sample text once when `dim` is `None`.
    ///
    /// # Errors
    /// Returns `RagError::Embedding` if the sample request fails, or
    /// `RagError::Config` if a configured `dim` is zero.
    pub async fn connect(svc: Arc<OllamaService>, dim: Option<usize>) -> Result<Self, RagError> {
        let dim = match dim {
            Some(0) => return Err(RagError::Config("EMBEDDING_DIM must be > 0".into())),
            Some(d) => d,
            None => {
                let v = svc.embeddings(DIMENSION_SAMPLE).await?;
                debug!("OllamaEmbedder::connect discovered dim={}", v.len());
                v.len()
            }
        };
        info!(model = svc.model(), dim, "ollama embedder ready");
        Ok(Self::new(svc, dim))
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let resp = self.svc.embeddings(text).await?;

            if resp.len() != self.dim {
                return Err(RagError::VectorSizeMismatch {
                    got: resp.len(),
                    want: self.dim,
                });
            }

            Ok(resp)
        })
    }
}
