/// Backend that turns text into embedding vectors.
///
/// Only a local Ollama runtime is wired today. New backends extend this enum
/// and get their own client under `services`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingProvider {
    /// Local Ollama runtime (`/api/embeddings`).
    Ollama,
}
