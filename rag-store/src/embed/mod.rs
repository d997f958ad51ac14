//! Embedding abstraction.
//!
//! Both pipelines must share one provider: vectors from different models (or
//! dimensions) live in unrelated spaces and their scores are meaningless.

use futures::future::BoxFuture;

use crate::errors::RagError;

pub mod hashing;
pub mod ollama;

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in your own embedding backend (e.g., Ollama, OpenAI, local models).
pub trait EmbeddingsProvider: Send + Sync {
    /// Length of every vector returned by [`EmbeddingsProvider::embed`].
    fn dimension(&self) -> usize;

    /// Produces an embedding vector for the given text.
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>>;
}
